//! List command implementation

use anyhow::{Context, Result};
use fc_core::Table;
use serde_json::json;

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::commands::common::CommandContext;

/// Execute the ls command
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(global, &args.cases)?;

    match args.output {
        LsOutput::Tree => {
            for loaded in &ctx.cases {
                println!("{} ({})", loaded.case.name, loaded.path.display());
                for (resource, fixture) in &loaded.case.resources {
                    println!("  {}", resource);
                    for line in tree_lines(&fixture.table) {
                        println!("    {}", line);
                    }
                }
            }
        }
        LsOutput::Json => {
            let cases: Vec<_> = ctx
                .cases
                .iter()
                .map(|loaded| {
                    let resources: serde_json::Map<String, serde_json::Value> = loaded
                        .case
                        .resources
                        .iter()
                        .map(|(name, fixture)| {
                            (
                                name.to_string(),
                                json!({
                                    "table": fixture.table,
                                    "rows": fixture.rows.len(),
                                }),
                            )
                        })
                        .collect();
                    json!({
                        "name": loaded.case.name,
                        "path": loaded.path.display().to_string(),
                        "resources": resources,
                    })
                })
                .collect();
            let output =
                serde_json::to_string_pretty(&cases).context("Failed to serialize case list")?;
            println!("{}", output);
        }
    }

    Ok(())
}

/// One line per table and column, indented by depth
pub(crate) fn tree_lines(table: &Table) -> Vec<String> {
    let mut lines = Vec::new();
    push_lines(table, 0, &mut lines);
    lines
}

fn push_lines(table: &Table, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let marker = if table.ignore_in_tests {
        " [ignored]"
    } else {
        ""
    };
    lines.push(format!("{}{}{}", indent, table.name, marker));
    for column in &table.columns {
        let marker = if column.ignore_in_tests {
            " [ignored]"
        } else {
            ""
        };
        lines.push(format!(
            "{}  - {} {}{}",
            indent, column.name, column.column_type, marker
        ));
    }
    for relation in &table.relations {
        push_lines(relation, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_core::{Column, ColumnType};

    #[test]
    fn test_tree_lines() {
        let table = Table::new("widgets")
            .with_column(Column::new("id", ColumnType::BigInt))
            .with_column(Column::new("notes", ColumnType::String).ignored_in_tests())
            .with_relation(
                Table::new("widget_tags")
                    .ignored_in_tests()
                    .with_column(Column::new("tag", ColumnType::String)),
            );

        assert_eq!(
            tree_lines(&table),
            vec![
                "widgets",
                "  - id big_int",
                "  - notes string [ignored]",
                "  widget_tags [ignored]",
                "    - tag string",
            ]
        );
    }
}
