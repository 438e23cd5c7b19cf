use crate::vnode::VNode;

/// Options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: String::new(),
        }
    }
}

pub(crate) struct Context {
    options: HtmlOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    pub(crate) fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    pub(crate) fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize a node tree to HTML
pub fn to_html(node: &VNode, options: HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    write_node(node, &mut ctx);
    ctx.get_output()
}

pub(crate) fn write_node(node: &VNode, ctx: &mut Context) {
    match node {
        VNode::Element {
            tag,
            attributes,
            styles,
            children,
            key,
        } => {
            if ctx.options.pretty {
                ctx.add_indent();
            }
            ctx.add(&format!("<{}", tag));

            if let Some(key) = key {
                ctx.add(&format!(" data-block-id=\"{}\"", escape_html(key)));
            }
            for (name, value) in attributes {
                ctx.add(&format!(" {}=\"{}\"", name, escape_html(value)));
            }
            if !styles.is_empty() {
                let css: Vec<String> = styles.iter().map(|(k, v)| format!("{}: {};", k, v)).collect();
                ctx.add(&format!(" style=\"{}\"", escape_html(&css.join(" "))));
            }

            if children.is_empty() && is_self_closing(tag) {
                ctx.add(" />");
                if ctx.options.pretty {
                    ctx.add("\n");
                }
                return;
            }

            ctx.add(">");

            let block_children = has_element_children(children);
            if !children.is_empty() {
                if ctx.options.pretty && block_children {
                    ctx.add("\n");
                }
                ctx.indent();
                for child in children {
                    write_child(child, block_children, ctx);
                }
                ctx.dedent();
                if ctx.options.pretty && block_children {
                    ctx.add_indent();
                }
            }

            ctx.add(&format!("</{}>", tag));
            if ctx.options.pretty {
                ctx.add("\n");
            }
        }

        VNode::Text { content } => ctx.add(&escape_html(content)),

        VNode::Comment { content } => {
            ctx.add_line(&format!("<!-- {} -->", content.replace("--", "- -")));
        }
    }
}

/// Text among element siblings goes on its own line when pretty printing
fn write_child(child: &VNode, own_line: bool, ctx: &mut Context) {
    match child {
        VNode::Text { content } if own_line => ctx.add_line(&escape_html(content)),
        _ => write_node(child, ctx),
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn has_element_children(children: &[VNode]) -> bool {
    children
        .iter()
        .any(|child| !matches!(child, VNode::Text { .. }))
}
