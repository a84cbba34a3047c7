use crate::core::FactRecord;

/// Definition-count complexity used for the corpus baseline:
/// classes + top-level functions + imports.
pub fn structural_complexity(record: &FactRecord) -> usize {
    record.classes.len() + record.functions.len() + record.imports.len()
}

/// Branch-weighted complexity of a file.
///
/// imports + Σ function branch complexity + Σ method branch complexity + classes
pub fn raw_complexity(record: &FactRecord) -> u32 {
    let functions: u32 = record.functions.iter().map(|f| f.branch_complexity).sum();
    let methods: u32 = record.methods().map(|(_, m)| m.branch_complexity).sum();
    record.imports.len() as u32 + functions + methods + record.classes.len() as u32
}

/// Debt weight used by the auditor: loc + 50 × class count
pub fn debt_score(loc: usize, class_count: usize) -> usize {
    loc + 50 * class_count
}
