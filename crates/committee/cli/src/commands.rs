use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use committee_canonical::{hash_value, CanonicalValue};
use committee_runtime::verify_run_hash;
use committee_types::RunOutcome;
use serde::Serialize;

use crate::inputs::{read_json, InputArgs};

pub fn exit_code(outcome: RunOutcome) -> ExitCode {
    match outcome {
        RunOutcome::Completed => ExitCode::SUCCESS,
        RunOutcome::Failed => ExitCode::from(2),
        RunOutcome::Vetoed => ExitCode::from(3),
        RunOutcome::ShortCircuited => ExitCode::from(4),
    }
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}

pub fn run(args: &InputArgs, run_log: Option<&Path>, output: Option<&Path>) -> anyhow::Result<ExitCode> {
    let inputs = args.load()?;
    let result = args.orchestrator()?.run(&inputs);

    let packet = to_json(&result.packet)?;
    match output {
        Some(path) => fs::write(path, packet).with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{packet}"),
    }
    if let Some(path) = run_log {
        fs::write(path, to_json(&result.run_log)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    eprintln!("outcome: {}", result.outcome);
    if !result.reasons().is_empty() {
        eprintln!("reasons: {}", result.reasons().join(", "));
    }
    Ok(exit_code(result.outcome))
}

pub fn replay(args: &InputArgs, times: usize) -> anyhow::Result<ExitCode> {
    let inputs = args.load()?;
    let report = committee_runtime::replay(&args.orchestrator()?, &inputs, times)?;

    println!("runs: {}", report.runs());
    println!("deterministic: {}", report.is_deterministic());
    if let Some(hash) = report.run_hash() {
        println!("run_hash: {hash}");
    }
    Ok(if report.is_deterministic() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn verify(args: &InputArgs, expected: &str) -> anyhow::Result<ExitCode> {
    let inputs = args.load()?;
    let result = args.orchestrator()?.run(&inputs);

    if verify_run_hash(&result, expected) {
        println!("run hash verified");
        return Ok(ExitCode::SUCCESS);
    }
    match result.run_hash() {
        Some(actual) => eprintln!("run hash mismatch: expected {}, got {actual}", expected.trim()),
        None => eprintln!("run produced no run hash (outcome {})", result.outcome),
    }
    Ok(ExitCode::FAILURE)
}

pub fn hash(file: &Path) -> anyhow::Result<ExitCode> {
    let value = read_json(file)?;
    println!("{}", hash_value(&CanonicalValue::from(value)));
    Ok(ExitCode::SUCCESS)
}
