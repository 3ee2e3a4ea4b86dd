use crate::diagnostic::{rules, Diagnostic};
use crate::markup::*;
use drafter_document::{
    format_number, Binding, BindingContext, BindingSlot, Element, ElementLookup, Literal,
    OwnerType, StateFlag, TracedPath,
};
use std::collections::HashSet;
use std::fmt::Write;

/// Serializer converts a normalized element tree into editor source
///
/// Output is deterministic: style keys, state flags, attributes and events
/// are emitted in sorted order, children in list order. Every binding that
/// is emitted as a member expression is recorded as a [`TracedPath`] so the
/// caller can write it back into `binding.path`.
pub struct Serializer<'ctx> {
    ctx: &'ctx BindingContext,
    indent_level: usize,
    indent_string: String,
    traced: Vec<TracedPath>,
    diagnostics: Vec<Diagnostic>,
}

impl<'ctx> Serializer<'ctx> {
    pub fn new(ctx: &'ctx BindingContext) -> Self {
        Self {
            ctx,
            indent_level: 0,
            indent_string: "  ".to_string(), // 2 spaces
            traced: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Serialize the tree rooted at `root` as bare JSX
    pub fn serialize<L: ElementLookup + ?Sized>(&mut self, lookup: &L, root: &str) -> String {
        let mut output = String::new();
        let mut visited = HashSet::new();
        self.serialize_element(lookup, root, &mut visited, &mut output);
        output
    }

    /// Serialize the tree wrapped in the editor module scaffold
    pub fn serialize_module<L: ElementLookup + ?Sized>(
        &mut self,
        lookup: &L,
        root: &str,
        name: &str,
    ) -> String {
        let mut output = String::new();
        output.push_str("import { props } from \"./props\";\n\n");
        let _ = writeln!(output, "export default function {}() {{", module_name(name));

        self.indent_level = 1;
        self.write_indent(&mut output);
        output.push_str("return (\n");

        self.indent_level = 2;
        let mut visited = HashSet::new();
        self.serialize_element(lookup, root, &mut visited, &mut output);

        self.indent_level = 1;
        self.write_indent(&mut output);
        output.push_str(");\n}\n");
        self.indent_level = 0;
        output
    }

    pub fn traced(&self) -> &[TracedPath] {
        &self.traced
    }

    pub fn take_traced(&mut self) -> Vec<TracedPath> {
        std::mem::take(&mut self.traced)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn serialize_element<L: ElementLookup + ?Sized>(
        &mut self,
        lookup: &L,
        id: &str,
        visited: &mut HashSet<String>,
        output: &mut String,
    ) {
        let Some(element) = lookup.element(id) else {
            self.diagnostics.push(Diagnostic::warning(
                rules::MISSING_CHILD,
                format!("element '{}' is referenced but does not exist", id),
            ));
            return;
        };
        if !visited.insert(id.to_string()) {
            self.diagnostics.push(
                Diagnostic::error(rules::CYCLE, format!("element '{}' is its own ancestor", id))
                    .for_element(id),
            );
            return;
        }

        self.write_indent(output);
        output.push('<');
        output.push_str(&element.tag);
        self.serialize_metadata(element, output);
        self.serialize_state(element, output);
        self.serialize_attributes(element, output);
        self.serialize_style(element, output);

        let properties = &element.properties;
        if element.is_void() {
            if !properties.content.is_empty() || !properties.children.is_empty() {
                self.diagnostics.push(
                    Diagnostic::warning(
                        rules::UNSUPPORTED_ATTRIBUTE,
                        format!("<{}> cannot have content or children", element.tag),
                    )
                    .for_element(&element.id),
                );
            }
            output.push_str(" />\n");
            return;
        }

        let has_marker = properties.has_bindings();
        if !has_marker && properties.content.is_empty() && properties.children.is_empty() {
            output.push_str(" />\n");
            return;
        }

        output.push_str(">\n");
        self.indent_level += 1;

        if has_marker {
            self.write_indent(output);
            let _ = writeln!(output, "{{{}}}", BINDINGS_MARKER);
        }
        self.serialize_content(element, output);

        for child_id in &properties.children {
            self.serialize_element(lookup, child_id, visited, output);
        }

        self.indent_level -= 1;
        self.write_indent(output);
        let _ = writeln!(output, "</{}>", element.tag);
    }

    fn serialize_metadata(&self, element: &Element, output: &mut String) {
        write_attr(output, ATTR_ID, &element.id);
        write_attr(output, ATTR_KIND, element.kind.as_str());
        if let Some(instance_ref) = &element.instance_ref {
            write_attr(output, ATTR_INSTANCE_REF, instance_ref);
        }
        if let Some(name) = &element.name {
            write_attr(output, ATTR_NAME, name);
        }

        let ownership = &element.ownership;
        write_attr(output, ATTR_OWNERSHIP_TYPE, ownership.owner_type.as_str());
        let owner_attr = match ownership.owner_type {
            OwnerType::Component => ATTR_COMPONENT_ID,
            _ => ATTR_OWNER_ID,
        };
        write_attr(output, owner_attr, &ownership.owner_id);
    }

    fn serialize_state(&mut self, element: &Element, output: &mut String) {
        for (flag, value) in &element.properties.state {
            let name = format!("{}{}", STATE_PREFIX, flag);
            if !is_attr_name(&name) {
                self.diagnostics.push(
                    Diagnostic::warning(
                        rules::UNSUPPORTED_STATE,
                        format!(
                            "state flag '{}' is not a valid attribute name and was skipped",
                            flag
                        ),
                    )
                    .for_element(&element.id),
                );
                continue;
            }
            match value {
                StateFlag::Bool(b) => {
                    let _ = write!(output, " {}={{{}}}", name, b);
                }
                StateFlag::Text(s) => write_attr(output, &name, s),
            }
        }
    }

    fn serialize_attributes(&mut self, element: &Element, output: &mut String) {
        let properties = &element.properties;
        for (name, value) in &properties.attributes {
            if self.check_attr_name(element, name) {
                write_attr(output, name, value);
            }
        }
        for (name, handler) in &properties.events {
            if properties.attributes.contains_key(name) {
                self.diagnostics.push(
                    Diagnostic::warning(
                        rules::RESERVED_ATTRIBUTE,
                        format!(
                            "event '{}' clashes with an attribute of the same name and was skipped",
                            name
                        ),
                    )
                    .for_element(&element.id),
                );
                continue;
            }
            if self.check_attr_name(element, name) {
                let _ = write!(output, " {}={{{}}}", name, handler);
            }
        }
    }

    fn check_attr_name(&mut self, element: &Element, name: &str) -> bool {
        if !is_reserved_attr(name) && is_attr_name(name) {
            return true;
        }
        self.diagnostics.push(
            Diagnostic::warning(
                rules::RESERVED_ATTRIBUTE,
                format!("attribute '{}' cannot be written to source and was skipped", name),
            )
            .for_element(&element.id),
        );
        false
    }

    fn serialize_style(&mut self, element: &Element, output: &mut String) {
        let style = &element.properties.style;
        let mut entries = Vec::new();

        for key in style.keys() {
            let value = match (style.binding_for(key), style.literal(key)) {
                (Some(binding), _) => {
                    match self.reference(element, binding, BindingSlot::Style(key.to_string())) {
                        Some(reference) => reference,
                        None => continue,
                    }
                }
                (None, Some(literal)) => style_literal(key, literal),
                (None, None) => continue,
            };

            let key = if is_plain_key(key) {
                key.to_string()
            } else {
                quote(key)
            };
            entries.push(format!("{}: {}", key, value));
        }

        if !entries.is_empty() {
            let _ = write!(output, " {}={{{{ {} }}}}", ATTR_STYLE, entries.join(", "));
        }
    }

    fn serialize_content(&mut self, element: &Element, output: &mut String) {
        let content = &element.properties.content;

        if let Some(binding) = &content.binding {
            if let Some(reference) = self.reference(element, binding, BindingSlot::Content) {
                self.write_indent(output);
                let _ = writeln!(output, "{{{}}}", reference);
            }
        }

        if let Some(text) = &content.text {
            self.write_indent(output);
            if needs_string_wrapper(text) {
                let _ = writeln!(output, "{{{}}}", quote(text));
            } else {
                let _ = writeln!(output, "{}", text);
            }
        }

        if let Some(expression) = &content.expression {
            self.write_indent(output);
            let _ = writeln!(output, "{{{}}}", expression);
        }
    }

    /// Member expression for a binding; falls back to the last traced path
    /// when the target is gone from the context.
    fn reference(&mut self, element: &Element, binding: &Binding, slot: BindingSlot) -> Option<String> {
        if let Some(reference) = self.ctx.reference_for(binding) {
            let fallback = match slot {
                BindingSlot::Content => self
                    .ctx
                    .by_id(binding.ref_kind, &binding.ref_id)
                    .and_then(|target| target.default_display.clone()),
                BindingSlot::Style(_) => None,
            };
            self.traced.push(TracedPath {
                element_id: element.id.clone(),
                slot,
                path: reference.clone(),
                fallback,
            });
            return Some(reference);
        }

        self.diagnostics.push(
            Diagnostic::warning(
                rules::UNRESOLVED_BINDING,
                format!(
                    "binding to {} '{}' has no target in scope",
                    binding.ref_kind, binding.ref_id
                ),
            )
            .for_element(&element.id),
        );
        binding.path.clone()
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }
}

fn write_attr(output: &mut String, name: &str, value: &str) {
    let _ = write!(output, " {}=\"{}\"", name, escape_attr(value));
}

/// JSX attribute names the parser can read back
fn is_attr_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-' | ':'))
        && !name.ends_with('-')
        && !name.contains("--")
}

fn style_literal(key: &str, literal: &Literal) -> String {
    match literal {
        Literal::Number(n) if !n.is_finite() => quote(&n.to_string()),
        Literal::Number(n) if is_size_key(key) => quote(&format!("{}px", format_number(*n))),
        Literal::Number(n) => format_number(*n),
        Literal::Text(s) if is_size_key(key) && s.trim().parse::<f64>().is_ok() => {
            quote(&format!("{}px", s.trim()))
        }
        Literal::Text(s) => quote(s),
    }
}

/// PascalCase function name for the module scaffold
pub fn module_name(name: &str) -> String {
    let mut out = String::new();
    for part in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }

    match out.chars().next() {
        None => "Screen".to_string(),
        Some(c) if c.is_ascii_digit() => format!("Screen{}", out),
        Some(_) => out,
    }
}
