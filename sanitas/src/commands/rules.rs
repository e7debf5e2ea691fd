//! `rules` command: prints the rule list a class resolves to.

use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};
use log::info;

use sanitas_core::{ClassRef, MetadataRegistry, SchemaConfig};

use crate::cli::RulesCommand;
use crate::constraints::stock_registry;

pub fn run_rules(cmd: &RulesCommand) -> Result<()> {
    let schema = SchemaConfig::load_from_file(&cmd.schema)?;
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let count = list_rules(&schema, &cmd.class, &mut writer)?;
    info!("Listed {} rule(s) for '{}'.", count, cmd.class);
    Ok(())
}

/// Registers `schema` and renders the rules of its class `class`.
///
/// The class is looked up among the schema's own classes, so a schema class
/// may share its name with the registry's root class.
pub fn list_rules<W: Write>(schema: &SchemaConfig, class: &str, writer: &mut W) -> Result<usize> {
    let mut registry = stock_registry();
    let classes = schema.register_into(&mut registry).context("Failed to register schema")?;
    let target = *classes
        .get(class)
        .ok_or_else(|| anyhow!("Class '{}' is not declared in the schema", class))?;
    render_rules(&registry, target, writer)
}

/// Writes one line per resolved rule, in application order. Returns the count.
pub fn render_rules<W: Write>(registry: &MetadataRegistry, target: ClassRef, writer: &mut W) -> Result<usize> {
    let rules = registry.lookup(target);

    writeln!(writer, "{:<20} {:<20} {:<5} {:<16} CONSTRAINTS", "PROPERTY", "KIND", "EACH", "DECLARED ON")?;
    for rule in &rules {
        let declared_on = registry.class_name(rule.target()).unwrap_or_default();
        let mut constraints: Vec<String> = rule.constraints().iter().map(|c| c.to_json().to_string()).collect();
        if let Some(rule_class) = rule.custom_rule_class() {
            let names: Vec<&str> =
                registry.lookup_constraints(rule_class).iter().map(|c| c.name.as_str()).collect();
            constraints.insert(0, format!("<{}>", names.join("+")));
        }
        writeln!(
            writer,
            "{:<20} {:<20} {:<5} {:<16} {}",
            rule.property_name(),
            rule.kind().as_str(),
            rule.each(),
            declared_on,
            constraints.join(" ")
        )?;
    }
    Ok(rules.len())
}
