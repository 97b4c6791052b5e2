//! Documentation and exported-type contract check

use super::FileCheck;
use crate::issue::{Finding, IssueKind, Severity};
use crate::rules::rules_for;
use genforge_artifact::GeneratedFile;

/// Flags undocumented exports and type-less public surfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractCheck;

impl FileCheck for ContractCheck {
    fn check(&self, file: &GeneratedFile) -> Vec<Finding> {
        let rules = rules_for(file.language);
        let source = file.content.as_str();

        let Some(export) = &rules.export else {
            return Vec::new();
        };
        let exports = export.find_iter(source).count();
        if exports == 0 {
            return Vec::new();
        }

        let mut findings = Vec::new();

        let documented = rules
            .doc_comment
            .as_ref()
            .is_some_and(|doc| doc.is_match(source));
        if !documented {
            findings.push(Finding::new(
                IssueKind::Contract,
                Severity::Warning,
                format!("{exports} exported symbols without any documentation comment"),
            ));
        }

        if file.language.is_statically_typed() {
            if let Some(type_export) = &rules.type_export {
                if !type_export.is_match(source) {
                    findings.push(Finding::new(
                        IssueKind::Contract,
                        Severity::Info,
                        "module exports values but no type or interface describing them",
                    ));
                }
            }
        }

        findings
    }
}
