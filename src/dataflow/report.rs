use super::*;

/// Per-instruction statistics of one program, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub program_depth: Depth,
    pub instructions: Vec<InstructionReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionReport {
    pub index: usize,
    pub latency: Latency,
    pub depth: Depth,
    pub src1_dep: Option<usize>,
    pub src2_dep: Option<usize>,
}

impl Report {
    /// Collect statistics for the instructions in `insts`, or for the whole
    /// trace when `insts` is empty.
    pub fn new(ctx: &ProgramContext, insts: &[usize]) -> Result<Self, AnalysisError> {
        let all: Vec<usize>;
        let insts = if insts.is_empty() {
            all = (0..ctx.len()).collect();
            &all[..]
        } else {
            insts
        };

        let mut instructions = Vec::with_capacity(insts.len());
        for &index in insts {
            let node = ctx.instruction(index)?;
            let latency = ctx.graph()[node].latency;
            let (src1_dep, src2_dep) = ctx.inst_deps(index)?;

            instructions.push(InstructionReport {
                index,
                latency,
                depth: ctx.inst_depth(index)?,
                src1_dep,
                src2_dep,
            });
        }

        Ok(Report {
            program_depth: ctx.prog_depth(),
            instructions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_whole_trace_by_default() {
        let trace = [
            Instruction::from_raw(0, -1, -1, 1),
            Instruction::from_raw(1, 1, -1, 2),
        ];
        let ctx = ProgramContext::analyze(&[1, 2], &trace).unwrap();

        let report = Report::new(&ctx, &[]).unwrap();

        assert_eq!(report.program_depth, 3);
        assert_eq!(
            report.instructions,
            vec![
                InstructionReport {
                    index: 0,
                    latency: 1,
                    depth: 0,
                    src1_dep: None,
                    src2_dep: None,
                },
                InstructionReport {
                    index: 1,
                    latency: 2,
                    depth: 1,
                    src1_dep: Some(0),
                    src2_dep: None,
                },
            ]
        );
    }

    #[test]
    fn unknown_instruction_fails() {
        let ctx = ProgramContext::analyze(&[1], &[Instruction::from_raw(0, -1, -1, 1)]).unwrap();

        assert!(Report::new(&ctx, &[0, 1]).is_err());
    }

    #[test]
    fn serializes_missing_dependencies_as_null() {
        let ctx = ProgramContext::analyze(&[1], &[Instruction::from_raw(0, -1, -1, 1)]).unwrap();
        let report = Report::new(&ctx, &[]).unwrap();

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["program_depth"], 1);
        assert!(json["instructions"][0]["src1_dep"].is_null());
    }
}
