use crate::error::Result;
use moldesc::core::descriptors::backend::{DescriptorBackend, ReferenceBackend};
use moldesc::engine::catalog::Catalog;
use std::fmt::Write;

pub fn run() -> Result<()> {
    print!("{}", render(&Catalog::standard(), &ReferenceBackend));
    Ok(())
}

fn render(catalog: &Catalog, backend: &dyn DescriptorBackend) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<8} {:<20} {:<8} {}",
        "DESCRIPTOR", "FLAG", "REPRESENTATION", "TYPE", "PROPERTIES"
    );
    for spec in catalog.iter() {
        let flag = format!("--{}", spec.key.alias());
        let mut properties = spec.property_names.join(", ");
        if !backend.is_bound(spec.key) {
            properties.push_str("  (unavailable)");
        }
        let _ = writeln!(
            out,
            "{:<20} {:<8} {:<20} {:<8} {}",
            spec.key.identifier(),
            flag,
            spec.representation.to_string(),
            spec.rule.value_kind().to_string(),
            properties
        );
        let _ = writeln!(out, "{:<20} {}", "", spec.description);
    }
    out
}
