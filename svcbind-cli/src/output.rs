//! Human and JSON rendering of bindings

use anyhow::{Context, Result};
use serde::Serialize;
use svcbind_core::ServiceBinding;
use svcbind_core::api::service_display_name;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to render JSON output")?;
    println!("{json}");
    Ok(())
}

fn application_label(binding: &ServiceBinding) -> String {
    let app = &binding.spec.application;
    let name = app.name.as_deref().unwrap_or_default();
    match app.kind.as_deref() {
        Some(kind) => format!("{name} ({kind})"),
        None => name.to_string(),
    }
}

fn services_label(binding: &ServiceBinding) -> String {
    binding
        .spec
        .services
        .iter()
        .map(service_display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn running_in_label(binding: &ServiceBinding) -> String {
    binding
        .status
        .as_ref()
        .and_then(|s| s.running_in)
        .map_or_else(|| "None".to_string(), |modes| modes.to_string())
}

/// Table of bindings; those declared in the devfile are marked with `*`
pub fn print_binding_table(bindings: &[ServiceBinding], in_devfile: &[String], offline: bool) {
    if bindings.is_empty() {
        println!("ℹ️  No ServiceBindings found");
        return;
    }

    let header = ["NAME", "APPLICATION", "SERVICES", "RUNNING IN"];
    let rows: Vec<[String; 4]> = bindings
        .iter()
        .map(|b| {
            let marker = if in_devfile.contains(&b.name) { "* " } else { "  " };
            [
                format!("{marker}{}", b.name),
                application_label(b),
                services_label(b),
                running_in_label(b),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.len() + 2);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    println!(
        "  {:<w0$}  {:<w1$}  {:<w2$}  {}",
        header[0],
        header[1],
        header[2],
        header[3],
        w0 = widths[0] - 2,
        w1 = widths[1],
        w2 = widths[2]
    );
    for row in &rows {
        println!(
            "{:<w0$}  {:<w1$}  {:<w2$}  {}",
            row[0],
            row[1],
            row[2],
            row[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        );
    }

    println!();
    println!("* ServiceBinding declared in the devfile");
    if offline {
        println!("⚠️  Cluster not reachable: only the bindings of the devfile are shown");
    }
}

pub fn print_descriptions(bindings: &[ServiceBinding]) {
    if bindings.is_empty() {
        println!("ℹ️  No ServiceBindings found");
        return;
    }

    let mut missing_status = false;
    for (i, binding) in bindings.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("ServiceBinding used by the current component:");
        println!();
        println!("Service Binding Name: {}", binding.name);
        println!("Services:");
        for service in &binding.spec.services {
            println!(" •  {}", service_display_name(service));
        }
        println!("Bind as files: {}", binding.spec.bind_as_files);
        println!(
            "Detect binding resources: {}",
            binding.spec.detect_binding_resources
        );
        if !binding.spec.naming_strategy.is_empty() {
            println!("Naming strategy: {}", binding.spec.naming_strategy);
        }

        let Some(status) = &binding.status else {
            missing_status = true;
            continue;
        };
        println!("Available binding information:");
        for item in status.binding_files.iter().chain(&status.binding_env_vars) {
            println!(" •  {item}");
        }
        if let Some(modes) = status.running_in {
            println!("Running in: {modes}");
        }
    }

    if missing_status {
        println!();
        println!(
            "Binding information for one or more ServiceBinding is not available because they don't exist on the cluster yet."
        );
        println!("Apply the devfile to the cluster first.");
    }
}
