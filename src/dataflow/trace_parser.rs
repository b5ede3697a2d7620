use super::*;
use nom::{digit, types::CompleteStr};
use std::{io, str::FromStr};

/// Read a trace with one `<opcode> <dest> <src1> <src2>` instruction per
/// line. Negative sources mark unused operands.
pub fn read_trace<T>(input: T) -> Result<Vec<Instruction>, TraceError>
	where T: io::BufRead
{
	let mut trace = Vec::new();

	for (line, content) in data_lines(input) {
		let content = content?;

		match instruction(CompleteStr(content.trim())) {
			Ok((rest, inst)) if rest.0.trim().is_empty() => trace.push(inst),
			_ => return Err(TraceError::ParseLine { line, content: content.clone() })
		}
	}

	Ok(trace)
}

/// Read a latency table with one latency per line; the n-th entry belongs
/// to opcode n.
pub fn read_latencies<T>(input: T) -> Result<Vec<Latency>, TraceError>
	where T: io::BufRead
{
	let mut latencies = Vec::new();

	for (line, content) in data_lines(input) {
		let content = content?;

		match latency(CompleteStr(content.trim())) {
			Ok((rest, l)) if rest.0.trim().is_empty() => latencies.push(l),
			_ => return Err(TraceError::ParseLine { line, content: content.clone() })
		}
	}

	Ok(latencies)
}

// Numbered lines, skipping blanks and `#` comments
fn data_lines<T>(input: T) -> impl Iterator<Item = (usize, io::Result<String>)>
	where T: io::BufRead
{
	input.lines()
		.enumerate()
		.map(|(i, l)| (i + 1, l))
		.filter(|(_, l)| match l {
			Ok(l) => {
				let l = l.trim();
				!l.is_empty() && !l.starts_with('#')
			}
			Err(_) => true
		})
}

named!(u32_digit<CompleteStr, u32>, map_res!(
	digit,
	|c: CompleteStr| FromStr::from_str(*c)
));

// Negative sources mark an unused operand, anything else must fit a register
named!(source<CompleteStr, Option<Register>>, alt!(
	map!(preceded!(tag!("-"), digit), |_| None) |
	map!(u32_digit, Some)
));

named!(instruction<CompleteStr, Instruction>, ws!(do_parse!(
	opcode: u32_digit  >>
	dest: u32_digit    >>
	src1: source       >>
	src2: source       >>
	(Instruction { opcode: opcode as Opcode, src1, src2, dest })
)));

named!(latency<CompleteStr, Latency>, ws!(do_parse!(
	value: u32_digit >>
	(value)
)));

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_instructions() {
		let input = "0 1 -1 -1\n# comment\n\n2 3 1 -1\n  1 4 3 1  \n";

		let trace = read_trace(input.as_bytes()).unwrap();

		assert_eq!(trace, vec![
			Instruction::from_raw(0, -1, -1, 1),
			Instruction::from_raw(2, 1, -1, 3),
			Instruction::from_raw(1, 3, 1, 4),
		]);
		assert_eq!(trace[0].src1, None);
		assert_eq!(trace[2].src2, Some(1));
	}

	#[test]
	fn reports_bad_trace_line() {
		let input = "0 1 -1 -1\n0 x 1 2\n";

		match read_trace(input.as_bytes()) {
			Err(TraceError::ParseLine { line, content }) => {
				assert_eq!(line, 2);
				assert_eq!(content, "0 x 1 2");
			}
			r => panic!("unexpected result {:?}", r)
		}
	}

	#[test]
	fn rejects_trailing_garbage() {
		assert!(read_trace("0 1 2 3 4\n".as_bytes()).is_err());
		assert!(read_trace("0 1 2\n".as_bytes()).is_err());
	}

	#[test]
	fn rejects_register_beyond_u32() {
		let input = "0 1 -1 -1\n0 2 4294967297 -1\n";

		match read_trace(input.as_bytes()) {
			Err(TraceError::ParseLine { line, .. }) => assert_eq!(line, 2),
			r => panic!("unexpected result {:?}", r)
		}
	}

	#[test]
	fn accepts_largest_register_and_any_negative() {
		let trace = read_trace("0 4294967295 4294967295 -4294967297\n".as_bytes()).unwrap();

		assert_eq!(trace[0].src1, Some(u32::max_value()));
		assert_eq!(trace[0].src2, None);
	}

	#[test]
	fn reads_latencies() {
		let input = "# opcode latencies\n1\n4\n\n2\n";

		assert_eq!(read_latencies(input.as_bytes()).unwrap(), vec![1, 4, 2]);
	}

	#[test]
	fn rejects_negative_latency() {
		assert!(read_latencies("1\n-3\n".as_bytes()).is_err());
	}
}
