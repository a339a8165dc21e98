// Mappers: convert between wire documents (JSON) and the scheduling model.
// Keeps serialization formats out of the scheduling core.

use super::scheduling_service::ScheduleReport;
use crate::scheduling::{Instance, Job, SchedulingError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Malformed instance document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Instance(#[from] SchedulingError),
}

/// Times of one job, as a `[release, duration, due]` triple or an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JobTimes {
    Triple(f64, f64, f64),
    Fields { release: f64, duration: f64, due: f64 },
}

impl JobTimes {
    fn into_tuple(self) -> (f64, f64, f64) {
        match self {
            JobTimes::Triple(release, duration, due) => (release, duration, due),
            JobTimes::Fields {
                release,
                duration,
                due,
            } => (release, duration, due),
        }
    }
}

/// Accepted instance documents.
///
/// `{"jobs": [{"id": .., "release": .., "duration": .., "due": ..}]}` keeps
/// the listed order as canonical order; an `id -> times` mapping is ordered
/// by id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstanceDocument {
    Listed { jobs: Vec<Job> },
    Mapped(BTreeMap<String, JobTimes>),
}

/// Parse and validate an instance from JSON text
pub fn parse_instance(json: &str) -> Result<Instance, MappingError> {
    let document: InstanceDocument = serde_json::from_str(json)?;
    let instance = match document {
        InstanceDocument::Listed { jobs } => Instance::new(jobs)?,
        InstanceDocument::Mapped(map) => Instance::from_map(
            map.into_iter()
                .map(|(id, times)| (id, times.into_tuple()))
                .collect(),
        )?,
    };
    Ok(instance)
}

/// Report as pretty-printed JSON
pub fn report_to_json(report: &ScheduleReport) -> Result<String, MappingError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Report as a plain-text table, one row per job in processing order
pub fn render_table(report: &ScheduleReport) -> String {
    let width = report
        .schedule
        .jobs
        .iter()
        .map(|j| j.id.len())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
        "id", "release", "duration", "due", "start", "finish", "pastdue",
    );
    for job in &report.schedule.jobs {
        let _ = writeln!(
            out,
            "{:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
            job.id,
            number(job.release),
            number(job.duration),
            number(job.due),
            number(job.start),
            number(job.finish),
            number(job.pastdue),
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} = {}  status: {}  bound: {}  gap: {}",
        report.objective,
        number(report.schedule.objective),
        report.status,
        number(report.best_bound),
        number(report.gap),
    );
    let _ = writeln!(
        out,
        "solver: {} ({})  found by: {}  nodes: {}  elapsed: {:.1} ms",
        report.solver,
        report.strategy,
        report.found_by,
        report.statistics.nodes_explored,
        report.statistics.elapsed_ms,
    );
    out
}

/// Whole numbers without decimals, everything else to three places
fn number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.3}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SchedulingService;
    use crate::scheduling::Objective;
    use crate::solver::MicroLpSolver;
    use std::sync::Arc;

    const PUBLISHED: &str = r#"{
        "A": [2, 5, 10],
        "B": [5, 6, 21],
        "C": [4, 8, 15],
        "D": [0, 4, 10],
        "E": [0, 2, 5],
        "F": [8, 3, 15],
        "G": [9, 2, 22]
    }"#;

    #[test]
    fn test_mapping_document() {
        let instance = parse_instance(PUBLISHED).unwrap();
        assert_eq!(instance.len(), 7);
        assert_eq!(instance.job(0).id, "A");
        assert_eq!(instance.big_m(), 39.0);
    }

    #[test]
    fn test_object_times_and_listed_order() {
        let mapped = parse_instance(
            r#"{"y": {"release": 0, "duration": 1, "due": 2}, "x": [1, 1, 3]}"#,
        )
        .unwrap();
        assert_eq!(mapped.job(0).id, "x");

        let listed = parse_instance(
            r#"{"jobs": [
                {"id": "y", "release": 0, "duration": 1, "due": 2},
                {"id": "x", "release": 1, "duration": 1, "due": 3}
            ]}"#,
        )
        .unwrap();
        assert_eq!(listed.job(0).id, "y");
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            parse_instance(r#"{"a": [0, 5, 4]}"#),
            Err(MappingError::Instance(SchedulingError::InvalidInstance(_)))
        ));
        assert!(matches!(
            parse_instance(r#"{"a": [0, 5]}"#),
            Err(MappingError::Parse(_))
        ));
        assert!(matches!(parse_instance("{}"), Err(MappingError::Instance(_))));
    }

    #[test]
    fn test_report_rendering() {
        let instance = parse_instance(PUBLISHED).unwrap();
        let report = SchedulingService::new(Arc::new(MicroLpSolver::new()))
            .solve(&instance, &Objective::TotalTardiness)
            .unwrap();

        let table = render_table(&report);
        assert!(table.starts_with("id"));
        // header, seven jobs, blank line, two summary lines
        assert_eq!(table.lines().count(), 11);
        assert!(table.contains("total-tardiness = 16"));
        assert!(table.contains("status: Optimal"));

        let json: serde_json::Value =
            serde_json::from_str(&report_to_json(&report).unwrap()).unwrap();
        assert_eq!(json["schedule"]["jobs"].as_array().unwrap().len(), 7);
        assert_eq!(json["objective"], "total-tardiness");
        assert!((json["schedule"]["objective"].as_f64().unwrap() - 16.0).abs() < 1e-6);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(16.0), "16");
        assert_eq!(number(2.5), "2.500");
        assert_eq!(number(3.0000000001), "3");
    }
}
