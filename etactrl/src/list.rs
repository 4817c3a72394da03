use clap::ArgMatches;
use etaapi::{EtaNode, VariableList};
use log::info;

pub(crate) fn nodes(args: &ArgMatches) -> anyhow::Result<()> {
    let client = crate::connect(args)?;
    let nodes = client.get_nodes()?;
    info!("found {} nodes", nodes.len());
    for (name, node) in &nodes {
        println!("{} ({})", name, node.uri());
    }
    Ok(())
}

pub(crate) fn tree(args: &ArgMatches) -> anyhow::Result<()> {
    let client = crate::connect(args)?;
    let nodes = client.get_nodes()?;

    let selected: Vec<&VariableList> = match args.value_of("node") {
        Some(name) => match nodes.get(name) {
            None => return Err(anyhow::anyhow!("Cannot find node {:?}", name)),
            Some(node) => vec![node],
        },
        None => nodes.values().collect(),
    };

    if args.is_present("json") {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    for node in selected {
        for line in tree_lines(node, 0) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// One line per node, children indented below their list.
fn tree_lines(list: &VariableList, depth: usize) -> Vec<String> {
    let mut lines = vec![format!("{}{} ({})", "  ".repeat(depth), list.name(), list.uri())];
    for node in list.elements().values() {
        match node {
            EtaNode::List(list) => lines.extend(tree_lines(list, depth + 1)),
            EtaNode::Variable(var) => lines.push(format!(
                "{}{} ({})",
                "  ".repeat(depth + 1),
                var.name(),
                var.uri()
            )),
        }
    }
    lines
}
