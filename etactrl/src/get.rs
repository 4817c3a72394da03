use std::collections::HashSet;

use clap::ArgMatches;
use etaapi::{Variable, VariableType};
use prettytable::{format, Cell, Row, Table};

use crate::parser;

pub(crate) fn get(args: &ArgMatches) -> anyhow::Result<()> {
    let path = args
        .value_of("path")
        .ok_or_else(|| anyhow::anyhow!("No node path given"))?;
    let types: Option<HashSet<VariableType>> = args.value_of("types").map(|types| {
        parser::parse_types(types)
            .unwrap_or_default()
            .into_iter()
            .collect()
    });

    let (node_name, rest) = match parser::split_path(path) {
        None => return Err(anyhow::anyhow!("Not a valid node path {:?}", path)),
        Some(split) => split,
    };

    let client = crate::connect(args)?;
    let mut nodes = client.get_nodes()?;
    let top = match nodes.get_mut(node_name) {
        None => return Err(anyhow::anyhow!("Cannot find node {:?}", node_name)),
        Some(top) => top,
    };

    let variables: Vec<&Variable> = if rest.is_empty() {
        client.update_list(top)?;
        top.variables()
    } else {
        let mut node = match top.find_mut(rest) {
            None => return Err(anyhow::anyhow!("Cannot find {:?} below {:?}", rest, node_name)),
            Some(node) => node,
        };
        node.update(&client)?;
        node.into_ref().variables()
    };

    let variables: Vec<&Variable> = variables
        .into_iter()
        .filter(|var| match (&types, var.variable_type()) {
            (Some(types), Some(kind)) => types.contains(&kind),
            _ => true,
        })
        .collect();

    if args.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&variables)?);
    } else {
        variable_table(&variables).printstd();
    }
    Ok(())
}

fn create_table() -> Table {
    let mut table = Table::new();
    let fmt = format::FormatBuilder::new()
        .padding(1, 1)
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('-', '+', '+', '+'),
        )
        .column_separator('|')
        .build();
    table.set_format(fmt);
    table
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

fn variable_table(variables: &[&Variable]) -> Table {
    let mut table = create_table();
    table.set_titles(Row::new(
        ["name", "uri", "value", "normalized", "text", "unit", "type", "updated"]
            .iter()
            .map(|title| Cell::new_align(title, format::Alignment::CENTER))
            .collect(),
    ));

    for var in variables {
        table.add_row(Row::new(vec![
            Cell::new(var.name()),
            Cell::new(var.uri()),
            Cell::new_align(
                &var.value().map(|v| v.to_string()).unwrap_or_default(),
                format::Alignment::RIGHT,
            ),
            Cell::new_align(&normalized(var), format::Alignment::RIGHT),
            Cell::new(var.str_value().unwrap_or_default()),
            Cell::new(var.unit()),
            Cell::new(
                &var.variable_type()
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
            ),
            Cell::new(
                &var.last_updated()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            ),
        ]));
    }
    table
}

/// The normalized value printed with the decimal places the device asks for.
fn normalized(var: &Variable) -> String {
    match (var.variable_type(), var.normalized_value()) {
        (Some(VariableType::Default), Some(value)) => {
            format!("{:.*}", var.dec_places().max(0) as usize, value)
        }
        _ => String::new(),
    }
}
