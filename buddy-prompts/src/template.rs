//! Minimal `{{name}}` template engine with one conditional form.
//!
//! Templates are parsed once into nodes and rendered against a slice of
//! `(name, value)` bindings. Single braces pass through, so JSON examples
//! can live inside a template.

use std::collections::BTreeSet;

/// Result alias for template parsing and rendering.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Template failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder marked as required had no binding, or an empty one.
    #[error("no value bound for required placeholder `{name}`")]
    Unbound {
        /// Placeholder name.
        name: String,
    },

    /// The template text could not be parsed.
    #[error("malformed template at byte {offset}: {reason}")]
    Malformed {
        /// Byte offset of the offending tag.
        offset: usize,
        /// What was wrong with it.
        reason: String,
    },
}

impl TemplateError {
    fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            offset,
            reason: reason.into(),
        }
    }
}

/// A parsed template.
///
/// `{{#if name}}..{{else}}..{{/if}}` picks a branch on whether `name` is bound
/// to a non-empty value; `{{else}}` is optional and blocks nest. Unbound
/// placeholders render empty unless declared with [`PromptTemplate::require`].
///
/// ```
/// use buddy_prompts::PromptTemplate;
///
/// let template =
///     PromptTemplate::parse("Market: {{#if market}}{{market}}{{else}}General{{/if}}").unwrap();
///
/// assert_eq!(template.render(&[]).unwrap(), "Market: General");
/// assert_eq!(template.render(&[("market", "Fintech")]).unwrap(), "Market: Fintech");
/// ```
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    source: String,
    nodes: Vec<Node>,
    required: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Literal(String),
    Slot(String),
    Branch {
        test: String,
        yes: Vec<Node>,
        no: Vec<Node>,
    },
}

impl PromptTemplate {
    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Malformed`] for an unterminated tag, an unknown
    /// block tag, or unbalanced `#if`/`else`/`/if`.
    pub fn parse(source: impl Into<String>) -> TemplateResult<Self> {
        let source = source.into();
        let nodes = Parser::default().run(&source)?;
        Ok(Self {
            source,
            nodes,
            required: Vec::new(),
        })
    }

    /// Makes rendering fail when `name` is unbound or empty.
    #[must_use]
    pub fn require(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Text the template was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every name referenced by a placeholder or a conditional.
    #[must_use]
    pub fn placeholders(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        collect_names(&self.nodes, &mut names);
        names
    }

    /// Renders against `bindings`. Later bindings shadow earlier ones.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Unbound`] for a required placeholder without a value.
    pub fn render(&self, bindings: &[(&str, &str)]) -> TemplateResult<String> {
        let value = |name: &str| {
            bindings
                .iter()
                .rev()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .filter(|value| !value.is_empty())
        };

        if let Some(name) = self.required.iter().find(|name| value(name.as_str()).is_none()) {
            return Err(TemplateError::Unbound { name: name.clone() });
        }

        let mut out = String::with_capacity(self.source.len());
        emit(&self.nodes, &value, &mut out);
        Ok(out)
    }
}

fn emit<'v>(nodes: &[Node], value: &impl Fn(&str) -> Option<&'v str>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Slot(name) => out.push_str(value(name.as_str()).unwrap_or_default()),
            Node::Branch { test, yes, no } => {
                emit(if value(test.as_str()).is_some() { yes } else { no }, value, out);
            }
        }
    }
}

fn collect_names<'a>(nodes: &'a [Node], names: &mut BTreeSet<&'a str>) {
    for node in nodes {
        match node {
            Node::Literal(_) => {}
            Node::Slot(name) => {
                names.insert(name.as_str());
            }
            Node::Branch { test, yes, no } => {
                names.insert(test.as_str());
                collect_names(yes, names);
                collect_names(no, names);
            }
        }
    }
}

/// An `#if` block still waiting for its `/if`.
struct OpenBranch {
    test: String,
    opened_at: usize,
    yes: Vec<Node>,
    no: Option<Vec<Node>>,
}

#[derive(Default)]
struct Parser {
    top: Vec<Node>,
    open: Vec<OpenBranch>,
}

impl Parser {
    fn sink(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(branch) => branch.no.as_mut().unwrap_or(&mut branch.yes),
            None => &mut self.top,
        }
    }

    fn run(mut self, source: &str) -> TemplateResult<Vec<Node>> {
        let mut cursor = 0;

        while let Some(found) = source[cursor..].find("{{") {
            let open = cursor + found;
            if open > cursor {
                self.sink().push(Node::Literal(source[cursor..open].to_owned()));
            }

            let inner = open + 2;
            let close = source[inner..]
                .find("}}")
                .map(|len| inner + len)
                .ok_or_else(|| TemplateError::malformed(open, "tag is never closed"))?;
            self.tag(source[inner..close].trim(), open)?;
            cursor = close + 2;
        }

        if let Some(branch) = self.open.last() {
            return Err(TemplateError::malformed(
                branch.opened_at,
                format!("`#if {}` is never closed", branch.test),
            ));
        }
        if cursor < source.len() {
            self.top.push(Node::Literal(source[cursor..].to_owned()));
        }
        Ok(self.top)
    }

    fn tag(&mut self, tag: &str, at: usize) -> TemplateResult<()> {
        match tag {
            "else" => match self.open.last_mut() {
                Some(branch) if branch.no.is_none() => branch.no = Some(Vec::new()),
                _ => return Err(TemplateError::malformed(at, "`else` without an open `#if`")),
            },
            "/if" => {
                let branch = self
                    .open
                    .pop()
                    .ok_or_else(|| TemplateError::malformed(at, "`/if` without an open `#if`"))?;
                self.sink().push(Node::Branch {
                    test: branch.test,
                    yes: branch.yes,
                    no: branch.no.unwrap_or_default(),
                });
            }
            _ => {
                if let Some(test) = tag.strip_prefix("#if ") {
                    self.open.push(OpenBranch {
                        test: test.trim().to_owned(),
                        opened_at: at,
                        yes: Vec::new(),
                        no: None,
                    });
                } else if tag.is_empty() || tag.starts_with(['#', '/']) {
                    return Err(TemplateError::malformed(at, format!("unknown tag `{tag}`")));
                } else {
                    self.sink().push(Node::Slot(tag.to_owned()));
                }
            }
        }
        Ok(())
    }
}
