//! Directive templates used by base VCL files.
//!
//! Supported constructions:
//! - `{{var path}}` substitutes a value; `path` may be dotted (`item.ip`).
//! - `{{if path}}...{{else}}...{{/if}}` and `{{depend path}}...{{/depend}}`.
//! - `{{for item in path}}...{{/for}}` iterates arrays, or object values in
//!   stored order.
//!
//! Unresolved variables render as empty text. Unknown `{{...}}` constructions
//! are copied through unchanged.

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;

use crate::variables::VariableMap;

/// Errors raised while parsing a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A block directive was never closed.
    #[error("template block not closed")]
    UnclosedBlock {
        /// Directive that opened the block.
        directive: &'static str,
        /// Byte offset of the opening directive.
        offset: usize,
    },
    /// A closing or `else` directive had no matching open block.
    #[error("unexpected template directive")]
    UnexpectedDirective {
        /// Directive as written.
        directive: String,
        /// Byte offset of the directive.
        offset: usize,
    },
    /// A directive argument could not be parsed.
    #[error("malformed template directive")]
    MalformedDirective {
        /// Directive name.
        directive: &'static str,
        /// Argument as written.
        argument: String,
        /// Byte offset of the directive.
        offset: usize,
    },
}

/// Convenience alias for template results.
pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Var(String),
    Conditional {
        path: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Loop {
        binding: String,
        path: String,
        body: Vec<Node>,
    },
}

/// A parsed template, renderable any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source.
    ///
    /// # Errors
    ///
    /// Returns an error for unbalanced blocks or malformed directive arguments.
    pub fn parse(source: &str) -> TemplateResult<Self> {
        let mut parser = Parser::default();
        let mut rest = source;
        let mut offset = 0;

        while let Some(start) = rest.find("{{") {
            let Some(length) = rest[start + 2..].find("}}") else {
                break;
            };
            let end = start + 2 + length + 2;
            parser.text(&rest[..start]);
            parser.directive(&rest[start + 2..end - 2], &rest[start..end], offset + start)?;
            rest = &rest[end..];
            offset += end;
        }
        parser.text(rest);

        parser.finish()
    }

    /// Render with the given variables.
    #[must_use]
    pub fn render(&self, variables: &VariableMap) -> String {
        let mut scope = RenderScope {
            variables,
            bindings: Vec::new(),
        };
        let mut out = String::new();
        render_nodes(&self.nodes, &mut scope, &mut out);
        out
    }
}

/// Parse and render `source` in one step.
///
/// # Errors
///
/// Returns an error when the template cannot be parsed.
pub fn render(source: &str, variables: &VariableMap) -> TemplateResult<String> {
    Ok(Template::parse(source)?.render(variables))
}

enum Opening {
    If(String),
    Depend(String),
    For { binding: String, path: String },
}

impl Opening {
    const fn directive(&self) -> &'static str {
        match self {
            Self::If(_) => "if",
            Self::Depend(_) => "depend",
            Self::For { .. } => "for",
        }
    }
}

struct Frame {
    opening: Opening,
    offset: usize,
    then: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

#[derive(Default)]
struct Parser {
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl Parser {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(Frame {
                otherwise: Some(nodes),
                ..
            }) => nodes,
            Some(frame) => &mut frame.then,
            None => &mut self.root,
        }
    }

    fn text(&mut self, text: &str) {
        if !text.is_empty() {
            self.current().push(Node::Text(text.to_string()));
        }
    }

    fn directive(&mut self, inner: &str, construction: &str, offset: usize) -> TemplateResult<()> {
        let trimmed = inner.trim();
        let (name, argument) = trimmed
            .split_once(char::is_whitespace)
            .map_or((trimmed, ""), |(name, argument)| (name, argument.trim()));

        match name {
            "var" => {
                let path = parse_path("var", argument, offset)?;
                self.current().push(Node::Var(path));
            }
            "if" => {
                let path = parse_path("if", argument, offset)?;
                self.open(Opening::If(path), offset);
            }
            "depend" => {
                let path = parse_path("depend", argument, offset)?;
                self.open(Opening::Depend(path), offset);
            }
            "for" => {
                let (binding, path) = parse_loop(argument, offset)?;
                self.open(Opening::For { binding, path }, offset);
            }
            "else" => self.otherwise(offset)?,
            "/if" | "/depend" | "/for" => self.close(name, offset)?,
            _ => self.text(construction),
        }
        Ok(())
    }

    fn open(&mut self, opening: Opening, offset: usize) {
        self.stack.push(Frame {
            opening,
            offset,
            then: Vec::new(),
            otherwise: None,
        });
    }

    fn otherwise(&mut self, offset: usize) -> TemplateResult<()> {
        match self.stack.last_mut() {
            Some(frame) if matches!(frame.opening, Opening::If(_)) && frame.otherwise.is_none() => {
                frame.otherwise = Some(Vec::new());
                Ok(())
            }
            _ => Err(TemplateError::UnexpectedDirective {
                directive: "else".to_string(),
                offset,
            }),
        }
    }

    fn close(&mut self, name: &str, offset: usize) -> TemplateResult<()> {
        let directive = name.trim_start_matches('/');
        let frame = match self.stack.pop() {
            Some(frame) if frame.opening.directive() == directive => frame,
            other => {
                if let Some(frame) = other {
                    self.stack.push(frame);
                }
                return Err(TemplateError::UnexpectedDirective {
                    directive: name.to_string(),
                    offset,
                });
            }
        };

        let node = match frame.opening {
            Opening::If(path) | Opening::Depend(path) => Node::Conditional {
                path,
                then: frame.then,
                otherwise: frame.otherwise.unwrap_or_default(),
            },
            Opening::For { binding, path } => Node::Loop {
                binding,
                path,
                body: frame.then,
            },
        };
        self.current().push(node);
        Ok(())
    }

    fn finish(self) -> TemplateResult<Template> {
        if let Some(frame) = self.stack.last() {
            return Err(TemplateError::UnclosedBlock {
                directive: frame.opening.directive(),
                offset: frame.offset,
            });
        }
        Ok(Template { nodes: self.root })
    }
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn parse_path(directive: &'static str, argument: &str, offset: usize) -> TemplateResult<String> {
    if argument.split('.').all(is_identifier) {
        Ok(argument.to_string())
    } else {
        Err(TemplateError::MalformedDirective {
            directive,
            argument: argument.to_string(),
            offset,
        })
    }
}

fn parse_loop(argument: &str, offset: usize) -> TemplateResult<(String, String)> {
    let mut parts = argument.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(binding), Some("in"), Some(path), None) if is_identifier(binding) => {
            let path = parse_path("for", path, offset)?;
            Ok((binding.to_string(), path))
        }
        _ => Err(TemplateError::MalformedDirective {
            directive: "for",
            argument: argument.to_string(),
            offset,
        }),
    }
}

struct RenderScope<'a> {
    variables: &'a VariableMap,
    bindings: Vec<(&'a str, &'a Value)>,
}

impl<'a> RenderScope<'a> {
    fn lookup(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        let root = self
            .bindings
            .iter()
            .rev()
            .find(|(name, _)| *name == head)
            .map(|(_, value)| *value)
            .or_else(|| self.variables.get(head))?;

        segments.try_fold(root, |value, segment| match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

fn render_nodes<'a>(nodes: &'a [Node], scope: &mut RenderScope<'a>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => {
                if let Some(value) = scope.lookup(path) {
                    out.push_str(&display(value));
                }
            }
            Node::Conditional {
                path,
                then,
                otherwise,
            } => {
                let branch = if scope.lookup(path).is_some_and(is_truthy) {
                    then
                } else {
                    otherwise
                };
                render_nodes(branch, scope, out);
            }
            Node::Loop {
                binding,
                path,
                body,
            } => {
                let items: Vec<&'a Value> = match scope.lookup(path) {
                    Some(Value::Array(items)) => items.iter().collect(),
                    Some(Value::Object(map)) => map.values().collect(),
                    _ => Vec::new(),
                };
                for item in items {
                    scope.bindings.push((binding.as_str(), item));
                    render_nodes(body, scope, out);
                    scope.bindings.pop();
                }
            }
        }
    }
}

fn display(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Number(number) => Cow::Owned(number.to_string()),
        Value::Bool(true) => Cow::Borrowed("1"),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => {
            Cow::Borrowed("")
        }
    }
}

// Empty collections are false here, unlike stored settings.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !(text.is_empty() || text == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> VariableMap {
        match value {
            Value::Object(map) => map,
            _ => VariableMap::new(),
        }
    }

    #[test]
    fn var_substitutes_scalars() {
        let variables = vars(json!({ "host": "web", "port": 8080, "on": true, "off": false }));
        let out = render("{{var host}}:{{var port}} [{{var on}}|{{var off}}]", &variables)
            .expect("template should render");
        assert_eq!(out, "web:8080 [1|]");
    }

    #[test]
    fn unresolved_variables_render_empty() {
        let out = render("a{{var missing}}b{{var host.deep}}c", &vars(json!({ "host": "x" })))
            .expect("template should render");
        assert_eq!(out, "abc");
    }

    #[test]
    fn if_else_follows_truthiness() {
        let template = Template::parse("{{if flag}}yes{{else}}no{{/if}}").expect("parse");
        assert_eq!(template.render(&vars(json!({ "flag": true }))), "yes");
        assert_eq!(template.render(&vars(json!({ "flag": "0" }))), "no");
        assert_eq!(template.render(&vars(json!({ "flag": {} }))), "no");
        assert_eq!(template.render(&vars(json!({}))), "no");
    }

    #[test]
    fn depend_renders_body_only_when_truthy() {
        let template = Template::parse("[{{depend name}}{{var name}}{{/depend}}]").expect("parse");
        assert_eq!(template.render(&vars(json!({ "name": "x" }))), "[x]");
        assert_eq!(template.render(&vars(json!({ "name": "" }))), "[]");
    }

    #[test]
    fn for_iterates_arrays_with_dotted_access() {
        let variables = vars(json!({ "access_list": [{ "ip": "1.1.1.1" }, { "ip": "2.2.2.2" }] }));
        let out = render(
            "{{for item in access_list}}\"{{var item.ip}}\";\n{{/for}}",
            &variables,
        )
        .expect("template should render");
        assert_eq!(out, "\"1.1.1.1\";\n\"2.2.2.2\";\n");
    }

    #[test]
    fn for_iterates_object_values_in_order() {
        let variables = vars(json!({
            "cookies": { "_9": { "cookie_name": "b" }, "_1": { "cookie_name": "a" } }
        }));
        let out = render("{{for c in cookies}}{{var c.cookie_name}},{{/for}}", &variables)
            .expect("template should render");
        assert_eq!(out, "b,a,");
    }

    #[test]
    fn loop_binding_shadows_outer_variables() {
        let variables = vars(json!({ "item": "outer", "list": ["inner"] }));
        let out = render("{{for item in list}}{{var item}}{{/for}}{{var item}}", &variables)
            .expect("template should render");
        assert_eq!(out, "innerouter");
    }

    #[test]
    fn nested_blocks_render() {
        let variables = vars(json!({ "rows": [{ "on": true, "v": "a" }, { "on": false, "v": "b" }] }));
        let out = render(
            "{{for r in rows}}{{if r.on}}{{var r.v}}{{else}}-{{/if}}{{/for}}",
            &variables,
        )
        .expect("template should render");
        assert_eq!(out, "a-");
    }

    #[test]
    fn unknown_constructions_are_kept() {
        let out = render("{{trans \"x\"}} {{ var host }}", &vars(json!({ "host": "h" })))
            .expect("template should render");
        assert_eq!(out, "{{trans \"x\"}} h");
    }

    #[test]
    fn unterminated_directive_is_text() {
        let out = render("a {{var host", &vars(json!({ "host": "h" }))).expect("render");
        assert_eq!(out, "a {{var host");
    }

    #[test]
    fn unclosed_block_is_rejected() {
        let err = Template::parse("x{{if a}}y").unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnclosedBlock {
                directive: "if",
                offset: 1
            }
        );
    }

    #[test]
    fn mismatched_close_is_rejected() {
        let err = Template::parse("{{for a in b}}{{/if}}").unwrap_err();
        assert!(matches!(err, TemplateError::UnexpectedDirective { .. }));
        let err = Template::parse("{{/for}}").unwrap_err();
        assert!(matches!(err, TemplateError::UnexpectedDirective { .. }));
    }

    #[test]
    fn else_outside_if_is_rejected() {
        assert!(Template::parse("{{else}}").is_err());
        assert!(Template::parse("{{depend a}}{{else}}{{/depend}}").is_err());
        assert!(Template::parse("{{if a}}{{else}}{{else}}{{/if}}").is_err());
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        assert!(matches!(
            Template::parse("{{for item of list}}{{/for}}"),
            Err(TemplateError::MalformedDirective {
                directive: "for",
                ..
            })
        ));
        assert!(Template::parse("{{var a..b}}").is_err());
        assert!(Template::parse("{{if }}{{/if}}").is_err());
    }
}
