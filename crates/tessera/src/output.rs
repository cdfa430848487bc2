// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text rendering of definitions for the CLI.

use std::fmt::Write;

use tessera_core::ComponentDefinition;

/// One row per definition: id, handle, provider and label in aligned columns.
pub fn definition_table(definitions: &[ComponentDefinition]) -> String {
    const HEADERS: [&str; 4] = ["ID", "HANDLE", "PROVIDER", "LABEL"];

    let rows: Vec<[&str; 4]> = definitions
        .iter()
        .map(|d| {
            [
                d.id.as_str(),
                d.handle.as_str(),
                d.provider.as_deref().unwrap_or("-"),
                d.label.as_deref().unwrap_or("-"),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&HEADERS).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Every field of one definition, including its config schema and metadata.
pub fn definition_detail(definition: &ComponentDefinition) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "id:       {}", definition.id);
    let _ = writeln!(out, "family:   {}", definition.family);
    let _ = writeln!(out, "handle:   {}", definition.handle);
    if let Some(provider) = &definition.provider {
        let _ = writeln!(out, "provider: {provider}");
    }
    if let Some(version) = &definition.version {
        let _ = writeln!(out, "version:  {version}");
    }
    if let Some(label) = &definition.label {
        let _ = writeln!(out, "label:    {label}");
    }

    if !definition.config_schema.is_empty() {
        let strict = if definition.config_schema.strict {
            " (strict)"
        } else {
            ""
        };
        let _ = writeln!(out, "config{strict}:");
        for (key, spec) in &definition.config_schema.keys {
            let required = if spec.required { ", required" } else { "" };
            let _ = writeln!(out, "  {key}: {}{required}", spec.kind);
        }
    }

    if !definition.metadata.is_empty() {
        let _ = writeln!(out, "metadata:");
        for (key, value) in &definition.metadata {
            let _ = writeln!(out, "  {key} = {value}");
        }
    }
    out
}
