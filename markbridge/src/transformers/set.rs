//! Ordered collection of transformers, one list per family

use super::standard;
use super::{
    ElementTransformer, MultilineElementTransformer, TextFormatTransformer, TextMatchTransformer,
    Transformer,
};
use crate::error::ConversionError;
use crate::escape::Escaper;
use crate::options::Extensions;
use crate::tree::{NodeSchema, TextFormat};

/// The rules handed to the import and export pipelines.
///
/// Order inside each family is registration order and decides precedence. The set
/// also owns the [`Escaper`] derived from its text-format tags; it is rebuilt every
/// time rules are added, so build the set completely before converting with it.
#[derive(Debug, Clone, Default)]
pub struct TransformerSet {
    element: Vec<ElementTransformer>,
    multiline: Vec<MultilineElementTransformer>,
    text_format: Vec<TextFormatTransformer>,
    text_match: Vec<TextMatchTransformer>,
    /// Text-format indices, longest opening tag first
    import_order: Vec<usize>,
    /// Single-flag text-format indices used on export, code last
    export_order: Vec<usize>,
    escaper: Escaper,
}

impl TransformerSet {
    /// Build a set from rules in precedence order
    pub fn new(transformers: impl IntoIterator<Item = Transformer>) -> Self {
        let mut set = TransformerSet::default();
        set.extend(transformers);
        set
    }

    /// Every built-in rule
    pub fn builtin() -> Self {
        Self::standard(&Extensions::default())
    }

    /// Built-in rules, leaving out the disabled extensions
    pub fn standard(extensions: &Extensions) -> Self {
        Self::new(standard::transformers(extensions))
    }

    /// Built-in rules with `custom` rules ahead of them in every family
    pub fn with_custom(custom: impl IntoIterator<Item = Transformer>) -> Self {
        let mut set = Self::builtin();
        set.prepend(custom);
        set
    }

    /// Append rules behind the existing ones
    pub fn extend(&mut self, transformers: impl IntoIterator<Item = Transformer>) {
        for transformer in transformers {
            match transformer {
                Transformer::Element(t) => self.element.push(t),
                Transformer::MultilineElement(t) => self.multiline.push(t),
                Transformer::TextFormat(t) => self.text_format.push(t),
                Transformer::TextMatch(t) => self.text_match.push(t),
            }
        }
        self.reindex();
    }

    /// Insert rules ahead of the existing ones, keeping their relative order
    pub fn prepend(&mut self, transformers: impl IntoIterator<Item = Transformer>) {
        let mut front = TransformerSet::default();
        front.extend(transformers);
        front.element.append(&mut self.element);
        front.multiline.append(&mut self.multiline);
        front.text_format.append(&mut self.text_format);
        front.text_match.append(&mut self.text_match);
        self.element = front.element;
        self.multiline = front.multiline;
        self.text_format = front.text_format;
        self.text_match = front.text_match;
        self.reindex();
    }

    fn reindex(&mut self) {
        let mut import_order: Vec<usize> = (0..self.text_format.len()).collect();
        // stable: equal lengths keep registration order
        import_order.sort_by_key(|&i| std::cmp::Reverse(self.text_format[i].open_tag().len()));
        self.import_order = import_order;

        let mut seen = TextFormat::PLAIN;
        let mut export_order = Vec::new();
        for (index, transformer) in self.text_format.iter().enumerate() {
            if transformer.is_single_format() && !seen.contains(transformer.format()) {
                seen.insert(transformer.format());
                export_order.push(index);
            }
        }
        export_order.sort_by_key(|&i| self.text_format[i].is_code());
        self.export_order = export_order;

        self.escaper = Escaper::new(
            self.text_format
                .iter()
                .flat_map(|t| [t.open_tag(), t.close_tag()]),
        );
    }

    pub fn element(&self) -> &[ElementTransformer] {
        &self.element
    }

    pub fn multiline(&self) -> &[MultilineElementTransformer] {
        &self.multiline
    }

    pub fn text_format(&self) -> &[TextFormatTransformer] {
        &self.text_format
    }

    pub fn text_match(&self) -> &[TextMatchTransformer] {
        &self.text_match
    }

    pub fn escaper(&self) -> &Escaper {
        &self.escaper
    }

    /// Text-format rules in the order they are tried on import
    pub fn import_formats(&self) -> impl Iterator<Item = (usize, &TextFormatTransformer)> {
        self.import_order
            .iter()
            .map(move |&index| (index, &self.text_format[index]))
    }

    /// Indices of the tags that render `format`, outermost first.
    ///
    /// Flags without a single-flag rule are not rendered.
    pub fn export_tags(&self, format: TextFormat) -> Vec<usize> {
        self.export_order
            .iter()
            .copied()
            .filter(|&index| format.contains(self.text_format[index].format()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.element.len() + self.multiline.len() + self.text_format.len() + self.text_match.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that every rule's dependencies are registered in `schema`
    pub fn validate(&self, schema: &NodeSchema) -> Result<(), ConversionError> {
        let dependencies = self
            .element
            .iter()
            .map(|t| (t.name(), t.dependencies()))
            .chain(self.multiline.iter().map(|t| (t.name(), t.dependencies())))
            .chain(self.text_match.iter().map(|t| (t.name(), t.dependencies())));
        for (name, node_types) in dependencies {
            if let Some(missing) = node_types.iter().find(|node_type| !schema.contains(node_type)) {
                return Err(ConversionError::MissingDependency {
                    transformer: name.to_string(),
                    node_type: missing.clone(),
                });
            }
        }
        Ok(())
    }
}
