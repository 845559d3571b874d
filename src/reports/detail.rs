//! Plain-text detail report.
//!
//! One file per run, appendable section grammar: a header banner, a
//! granule-count block with presence differences, one block per compared
//! granule with `Dimension-Level`, `Global Attribute-Level`, and
//! `Variable-Level` sub-sections, and a trailing summary of unequal granules.
//! Entries inside each sub-section are ordered reference-only names,
//! candidate-only names, then value mismatches.

use crate::diff::{AttributeDiff, DimensionDiff, GranuleVerdict, VariableComparison, VariableDiff};
use crate::error::{CompareError, Result};
use crate::pipeline::RunReport;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Renders the per-run plain-text detail report.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailReporter;

impl DetailReporter {
    /// Create a new detail reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// File name of the detail report for one run.
    #[must_use]
    pub fn file_name(identity: &str, timestamp: &str) -> String {
        format!("report_{identity}_{timestamp}.txt")
    }

    /// Render the full detail report.
    pub fn generate(
        &self,
        run: &RunReport,
        verdicts: &IndexMap<String, GranuleVerdict>,
        short_name: &str,
    ) -> String {
        let mut out = String::new();

        out.push_str(&format!("===== Granule Report for {short_name} =====\n"));
        out.push_str("\n<<<< Reference vs. Candidate Granule Differences >>>>\n");
        out.push_str(&format!(
            "\tNumber of granules in reference: {}.\n",
            run.reference_count
        ));
        out.push_str(&format!(
            "\tNumber of granules in candidate: {}.\n",
            run.candidate_count
        ));

        if !run.reference_only.is_empty() {
            out.push_str("\n\tGranules in reference only:\n");
            for name in &run.reference_only {
                out.push_str(&format!("\t\t{name}\n"));
            }
        }
        if !run.candidate_only.is_empty() {
            out.push_str("\n\tGranules in candidate only:\n");
            for name in &run.candidate_only {
                out.push_str(&format!("\t\t{name}\n"));
            }
        }

        out.push_str(&format!("\n{}\n", "=".repeat(86)));

        if run.nothing_to_compare() {
            out.push_str("\nNothing to compare: no matched granule pairs were found.\n");
            return out;
        }

        out.push_str(&format!(
            "\n=================== Granule Comparison Reports for {short_name} =======================\n"
        ));

        for (name, diff) in &run.diffs {
            out.push_str(&format!("\n\n<< Report for granule: {name} >>\n"));
            render_dimensions(&diff.dimensions, &mut out);
            render_attributes(&diff.attributes, &mut out);
            render_variables(&diff.variables, &mut out);
            out.push_str(&format!("{}\n", "-".repeat(86)));
        }

        let unequal = RunReport::unequal_granules(verdicts);
        if unequal.is_empty() {
            out.push_str("\n<<<< All granules that were compared are equal. >>>>\n");
        } else {
            out.push_str("\n<<<< Granules that are different: >>>>\n");
            for name in &unequal {
                out.push_str(&format!("\t{name}\n"));
            }
        }

        out
    }

    /// Render and write the report into `dir`, returning the file path.
    pub fn write_to(
        &self,
        dir: &Path,
        identity: &str,
        run: &RunReport,
        verdicts: &IndexMap<String, GranuleVerdict>,
        short_name: &str,
    ) -> Result<PathBuf> {
        let path = dir.join(Self::file_name(identity, &run.timestamp));
        let report = self.generate(run, verdicts, short_name);
        std::fs::write(&path, report).map_err(|e| CompareError::io(path.clone(), e))?;
        tracing::info!(path = %path.display(), "detail report written");
        Ok(path)
    }
}

fn render_name_list(out: &mut String, names: &[String], label: &str, accounted: &str) {
    if names.is_empty() {
        out.push_str(&format!("\t\t{accounted}\n"));
    } else {
        out.push_str(&format!("\t\t{label}\n"));
        for name in names {
            out.push_str(&format!("\t\t{name}\n"));
        }
    }
}

fn render_dimensions(diff: &DimensionDiff, out: &mut String) {
    out.push_str("\n<<<< Dimension-Level Differences >>>>\n");
    render_name_list(
        out,
        &diff.reference_only,
        "Dimensions in reference only:",
        "Dimensions in reference are accounted for.",
    );
    render_name_list(
        out,
        &diff.candidate_only,
        "Dimensions in candidate only:",
        "Dimensions in candidate are accounted for.",
    );

    if diff.size_mismatches.is_empty() {
        out.push_str("\t\tDimension sizes are the same.\n");
    } else {
        out.push_str("\t\tDimension sizes that are not equal:\n");
        for m in &diff.size_mismatches {
            out.push_str(&format!("\t\tName: {}\n", m.name));
            out.push_str(&format!("\t\t\tReference: {}\n", m.reference));
            out.push_str(&format!("\t\t\tCandidate: {}\n", m.candidate));
        }
    }
}

fn render_attributes(diff: &AttributeDiff, out: &mut String) {
    out.push_str("\n<<<< Global Attribute-Level Differences >>>>\n");
    render_name_list(
        out,
        &diff.reference_only,
        "Attributes in reference only:",
        "Attributes in reference are accounted for.",
    );
    render_name_list(
        out,
        &diff.candidate_only,
        "Attributes in candidate only:",
        "Attributes in candidate are accounted for.",
    );

    if diff.value_mismatches.is_empty() {
        out.push_str("\t\tAttribute values are the same.\n");
    } else {
        out.push_str("\t\tAttribute values that are not equal:\n");
        for m in &diff.value_mismatches {
            out.push_str(&format!("\t\tName: {}\n", m.name));
            out.push_str(&format!("\t\t\tReference: {}\n", m.reference));
            out.push_str(&format!("\t\t\tCandidate: {}\n", m.candidate));
        }
    }
}

fn render_variables(diff: &VariableDiff, out: &mut String) {
    out.push_str("\n<<<< Variable-Level Differences >>>>\n");
    render_name_list(
        out,
        &diff.reference_only,
        "Variables in reference only:",
        "Variables in reference are accounted for.",
    );
    render_name_list(
        out,
        &diff.candidate_only,
        "Variables in candidate only:",
        "Variables in candidate are accounted for.",
    );

    let mut all_equal = true;
    let mut mismatch_lines = String::new();
    for (name, comparison) in &diff.content {
        match comparison {
            // Already listed in the presence sets above; still unequal.
            VariableComparison::MissingCounterpart => all_equal = false,
            VariableComparison::Compared {
                attributes_equal,
                arrays_equal,
            } => {
                if !attributes_equal || !arrays_equal {
                    all_equal = false;
                    mismatch_lines.push_str(&format!("\t\t\t{name}:\n"));
                    mismatch_lines
                        .push_str(&format!("\t\t\t\tAttributes equal: {attributes_equal}\n"));
                    mismatch_lines.push_str(&format!("\t\t\t\tData equal: {arrays_equal}\n"));
                }
            }
        }
    }

    if mismatch_lines.is_empty() {
        if all_equal {
            out.push_str("\t\t\tAll variables have been accounted for.\n");
        }
    } else {
        out.push_str("\t\tVariable attributes and data that are not equal:\n");
        out.push_str(&mismatch_lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Granule, Variable};
    use crate::pipeline::compare_batch;
    use ndarray::arr1;

    fn one_pair_run(reference: Granule, candidate: Granule) -> RunReport {
        let mut ref_map = IndexMap::new();
        ref_map.insert("g1.nc".to_string(), reference);
        let mut cand_map = IndexMap::new();
        cand_map.insert("g1.nc".to_string(), candidate);
        compare_batch(&ref_map, &cand_map, "20260806T120000".to_string())
    }

    #[test]
    fn test_section_grammar_present() {
        let reference = Granule::new()
            .with_dimension("time", 10)
            .with_attribute("institution", "JPL");
        let candidate = Granule::new()
            .with_dimension("time", 12)
            .with_attribute("institution", "GSFC");
        let run = one_pair_run(reference, candidate);
        let verdicts = run.verdicts();

        let report = DetailReporter::new().generate(&run, &verdicts, "TEST-COLLECTION-v1");
        assert!(report.contains("===== Granule Report for TEST-COLLECTION-v1 ====="));
        assert!(report.contains("<<<< Dimension-Level Differences >>>>"));
        assert!(report.contains("<<<< Global Attribute-Level Differences >>>>"));
        assert!(report.contains("<<<< Variable-Level Differences >>>>"));
        assert!(report.contains("Name: time"));
        assert!(report.contains("\t\t\tReference: 10"));
        assert!(report.contains("\t\t\tCandidate: 12"));
        assert!(report.contains("<<<< Granules that are different: >>>>"));
        assert!(report.contains("\tg1.nc"));
    }

    #[test]
    fn test_equal_run_reports_all_equal() {
        let granule = Granule::new().with_variable(
            "sst",
            Variable::new(arr1(&[1.0]).into_dyn()).with_attribute("units", "kelvin"),
        );
        let run = one_pair_run(granule.clone(), granule);
        let verdicts = run.verdicts();

        let report = DetailReporter::new().generate(&run, &verdicts, "TEST-COLLECTION-v1");
        assert!(report.contains("<<<< All granules that were compared are equal. >>>>"));
        assert!(report.contains("All variables have been accounted for."));
    }

    #[test]
    fn test_nothing_to_compare_still_reports() {
        let run = compare_batch(
            &IndexMap::new(),
            &IndexMap::new(),
            "20260806T120000".to_string(),
        );
        let verdicts = run.verdicts();

        let report = DetailReporter::new().generate(&run, &verdicts, "TEST-COLLECTION-v1");
        assert!(report.contains("Nothing to compare"));
        assert!(report.contains("Number of granules in reference: 0."));
    }

    #[test]
    fn test_unequal_variable_block() {
        let reference = Granule::new()
            .with_variable("sst", Variable::new(arr1(&[1.0]).into_dyn()));
        let candidate = Granule::new()
            .with_variable("sst", Variable::new(arr1(&[2.0]).into_dyn()));
        let run = one_pair_run(reference, candidate);
        let verdicts = run.verdicts();

        let report = DetailReporter::new().generate(&run, &verdicts, "TEST-COLLECTION-v1");
        assert!(report.contains("Variable attributes and data that are not equal:"));
        assert!(report.contains("\t\t\tsst:"));
        assert!(report.contains("Data equal: false"));
    }

    #[test]
    fn test_file_name_shape() {
        assert_eq!(
            DetailReporter::file_name("aqua", "20260806T120000"),
            "report_aqua_20260806T120000.txt"
        );
    }
}
