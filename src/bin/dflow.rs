use dflow::dataflow::{self, ProgramContext, Report};
use std::{
    env,
    fs::File,
    io::{BufReader, BufWriter},
    process,
};
use tracing_subscriber::EnvFilter;

fn print_usage(prog_name: &str) {
    eprintln!("Usage: {} project_name [inst ...]", prog_name);
}

fn dep_label(dep: Option<usize>) -> i64 {
    dep.map_or(-1, |d| d as i64)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut arg_iter = env::args();

    // Program name
    let prog_name = match arg_iter.next() {
        Some(p) => p,
        None => {
            print_usage("./dflow");
            process::exit(1);
        }
    };

    // Project name
    let project_name = match arg_iter.next() {
        Some(n) => n,
        None => {
            print_usage(&prog_name);
            process::exit(1);
        }
    };

    // Instructions to query, all of them if none are given
    let mut insts = Vec::new();
    for arg in arg_iter {
        match arg.parse::<usize>() {
            Ok(i) => insts.push(i),
            Err(e) => {
                eprintln!("Invalid instruction index {}: {}", arg, e);
                process::exit(1);
            }
        }
    }

    // Read latency table
    let latencies = match File::open(&format!("{}.lat", &project_name)) {
        Ok(f) => match dataflow::read_latencies(BufReader::new(f)) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Could not read {}.lat: {}", &project_name, e);
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Could not open {}.lat: {}", &project_name, e);
            process::exit(1);
        }
    };

    // Read trace
    let trace = match File::open(&format!("{}.trace", &project_name)) {
        Ok(f) => match dataflow::read_trace(BufReader::new(f)) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Could not read {}.trace: {}", &project_name, e);
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Could not open {}.trace: {}", &project_name, e);
            process::exit(1);
        }
    };

    // Analyze dependencies
    let ctx = match ProgramContext::analyze(&latencies, &trace) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Could not analyze {}: {}", &project_name, e);
            process::exit(1);
        }
    };

    let report = match Report::new(&ctx, &insts) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Could not query {}: {}", &project_name, e);
            process::exit(1);
        }
    };

    for inst in report.instructions.iter() {
        println!(
            "Inst {}: depth {}, deps {} {}",
            inst.index,
            inst.depth,
            dep_label(inst.src1_dep),
            dep_label(inst.src2_dep)
        );
    }
    println!("Program depth: {}", report.program_depth);

    // Print graph to dot file
    let dot_file = match File::create(&format!("{}.dot", &project_name)) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Could not open {}.dot for writing: {}", &project_name, e);
            process::exit(1);
        }
    };
    if let Err(e) = dataflow::print_graph(&ctx, BufWriter::new(dot_file)) {
        eprintln!("Could not print graph to {}.dot: {}", &project_name, e);
        process::exit(1);
    }

    // Serialize report
    let report_file = match File::create(&format!("{}.json", &project_name)) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Could not open {}.json for writing: {}", &project_name, e);
            process::exit(1);
        }
    };
    if let Err(e) = serde_json::to_writer_pretty(BufWriter::new(report_file), &report) {
        eprintln!("Could not serialize report to {}.json: {}", &project_name, e);
        process::exit(1);
    }

    ctx.release();
}
