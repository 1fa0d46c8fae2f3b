/// The selection mini-language shared by the plotting accessors.
///
/// A selection string is a sequence of terms, each optionally carrying a
/// nested group: `"density(Re(xx)) Im(current(xy,yz))"`. Terms inside a
/// group are separated by commas or whitespace. The grammar knows nothing
/// about what the terms mean, each accessor interprets the expanded paths
/// itself.
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{
        char,
        multispace0,
        multispace1,
    },
    combinator::{
        all_consuming,
        map,
        opt,
    },
    multi::separated_list1,
    sequence::{
        delimited,
        preceded,
        tuple,
    },
    IResult,
};

use crate::types::{
    Result,
    RefinementError,
};


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub term: String,
    pub group: Vec<Node>,
}

impl Node {
    #[cfg(test)]
    fn leaf(term: &str) -> Self {
        Self { term: term.to_string(), group: Vec::new() }
    }
}


fn term(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == ':')(input)
}

fn node(input: &str) -> IResult<&str, Node> {
    let (input, name) = term(input)?;
    let (input, group) = opt(delimited(
        preceded(multispace0, char('(')),
        preceded(multispace0, node_list),
        preceded(multispace0, char(')')),
    ))(input)?;

    Ok((input, Node {
        term: name.to_string(),
        group: group.unwrap_or_default(),
    }))
}

fn separator(input: &str) -> IResult<&str, ()> {
    alt((
        map(tuple((multispace0, char(','), multispace0)), |_| ()),
        map(multispace1, |_| ()),
    ))(input)
}

fn node_list(input: &str) -> IResult<&str, Vec<Node>> {
    separated_list1(separator, node)(input)
}


/// Parse a selection string into its top-level nodes.
///
/// `None`-like input (empty or all whitespace) yields an empty tree, the
/// caller supplies its own defaults. Unbalanced parentheses, dangling
/// separators and empty groups are refinement errors.
pub fn parse(input: &str) -> Result<Vec<Node>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match all_consuming(node_list)(trimmed) {
        Ok((_, nodes)) => Ok(nodes),
        Err(_) => Err(RefinementError::MalformedSelection(input.to_string()).into()),
    }
}


/// Expand a tree into every root-to-leaf path, depth first, preserving the
/// order terms appeared in the input.
pub fn paths(nodes: &[Node]) -> Vec<Vec<&str>> {
    fn walk<'a>(node: &'a Node, stack: &mut Vec<&'a str>, out: &mut Vec<Vec<&'a str>>) {
        stack.push(node.term.as_str());
        if node.group.is_empty() {
            out.push(stack.clone());
        } else {
            for child in &node.group {
                walk(child, stack, out);
            }
        }
        stack.pop();
    }

    let mut out = Vec::new();
    let mut stack = Vec::new();
    for node in nodes {
        walk(node, &mut stack, &mut out);
    }
    out
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_flat() {
        let tree = parse("density current").unwrap();
        assert_eq!(tree, vec![Node::leaf("density"), Node::leaf("current")]);

        let tree = parse(" density , current ").unwrap();
        assert_eq!(tree, vec![Node::leaf("density"), Node::leaf("current")]);

        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_nested() {
        let tree = parse("density(Re(xx)) Im(current(xy,yz))").unwrap();
        assert_eq!(tree, vec![
            Node {
                term: "density".to_string(),
                group: vec![Node {
                    term: "Re".to_string(),
                    group: vec![Node::leaf("xx")],
                }],
            },
            Node {
                term: "Im".to_string(),
                group: vec![Node {
                    term: "current".to_string(),
                    group: vec![Node::leaf("xy"), Node::leaf("yz")],
                }],
            },
        ]);
    }

    #[test]
    fn test_paths_order() {
        let tree = parse("density(Re(xx)) Im(current(xy,yz)) Re(density,current)").unwrap();
        let paths = paths(&tree);
        assert_eq!(paths, vec![
            vec!["density", "Re", "xx"],
            vec!["Im", "current", "xy"],
            vec!["Im", "current", "yz"],
            vec!["Re", "density"],
            vec!["Re", "current"],
        ]);
    }

    #[test]
    fn test_mixed_separators() {
        let tree = parse("ion(xx zz(Re,Im))").unwrap();
        let paths = paths(&tree);
        assert_eq!(paths, vec![
            vec!["ion", "xx"],
            vec!["ion", "zz", "Re"],
            vec!["ion", "zz", "Im"],
        ]);
    }

    #[test]
    fn test_malformed() {
        for bad in ["density(Re(xx)", "density)", "(xx)", "density()", "a(b,)", ",density", "a b,"] {
            let err = parse(bad).unwrap_err();
            assert!(err.downcast_ref::<RefinementError>().is_some(), "no refinement error for {:?}", bad);
        }
    }
}
