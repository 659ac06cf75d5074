//! Names and descriptions of invented individuals.
//!
//! A kind's name or description template (or that of its nearest templated
//! ancestor) is rendered slot by slot. Without a template the name is the
//! modifiers followed by the noun, and the description is the name followed
//! by every property.

use itertools::Itertools;

use crate::invention::Invention;
use crate::ontology::{Kind, PartId, PropertyId, Template};
use crate::token::{Token, TokenKind, untokenize};

/// What a template has already rendered, so `[AllProperties]` can skip it.
#[derive(Debug, Default)]
struct Consumed {
    properties: Vec<PropertyId>,
    parts: Vec<PartId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Text {
    Name,
    Description,
}

/// Templates being rendered, outermost first. A template that would
/// re-enter itself (a container naming its part, whose description names
/// its container) renders the default name instead.
type Path = Vec<(usize, Text)>;

impl Invention {
    pub fn name(&self, individual: usize) -> String {
        self.name_within(individual, &mut Path::new())
    }

    pub fn description(&self, individual: usize) -> String {
        self.description_within(individual, &mut Path::new())
    }

    fn name_within(&self, individual: usize, path: &mut Path) -> String {
        if let Some(permanent) = self.individuals()[individual].permanent {
            return untokenize(&self.ontology().individual(permanent).name);
        }
        if path.contains(&(individual, Text::Name)) {
            return self.default_name(individual);
        }
        match self.template(individual, |kind| kind.name_template.as_ref()) {
            Some(template) => self.render(individual, template, Text::Name, path),
            None => self.default_name(individual),
        }
    }

    fn description_within(&self, individual: usize, path: &mut Path) -> String {
        if path.contains(&(individual, Text::Description)) {
            return self.default_name(individual);
        }
        if let Some(template) = self.template(individual, |kind| kind.description_template.as_ref())
        {
            return self.render(individual, template, Text::Description, path);
        }
        let name = self.name_within(individual, path);
        let properties = self.all_properties(individual, &Consumed::default(), path);
        if properties.is_empty() {
            name
        } else {
            format!("{name}, {properties}")
        }
    }

    /// Names of every individual, numbered where two would read the same.
    pub fn labels(&self) -> Vec<String> {
        let names: Vec<String> = (0..self.individuals().len())
            .map(|i| self.name(i))
            .collect();
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let total = names.iter().filter(|other| *other == name).count();
                if total == 1 {
                    return name.clone();
                }
                let nth = names[..=index].iter().filter(|other| *other == name).count();
                format!("{name} #{nth}")
            })
            .collect()
    }

    /// The most specific kind names, such as "persian".
    pub fn noun(&self, individual: usize) -> String {
        self.most_specific_kinds(individual)
            .into_iter()
            .map(|kind| self.ontology().kind_name(kind))
            .join(" ")
    }

    pub fn modifiers(&self, individual: usize) -> String {
        self.adjectives(individual)
            .into_iter()
            .map(|adjective| untokenize(&self.ontology().adjective(adjective).name))
            .join(" ")
    }

    fn default_name(&self, individual: usize) -> String {
        [self.modifiers(individual), self.noun(individual)]
            .into_iter()
            .filter(|text| !text.is_empty())
            .join(" ")
    }

    /// The template of the nearest kind that has one.
    fn template<'a>(
        &'a self,
        individual: usize,
        pick: impl Fn(&'a Kind) -> Option<&'a Template>,
    ) -> Option<&'a Template> {
        let ontology = self.ontology();
        self.most_specific_kinds(individual)
            .into_iter()
            .flat_map(|kind| ontology.ancestors(kind))
            .find_map(|kind| pick(ontology.kind(kind)))
    }

    fn render(&self, individual: usize, template: &Template, text: Text, path: &mut Path) -> String {
        path.push((individual, text));
        let mut consumed = Consumed::default();
        let mut tokens: Vec<Token> = Vec::new();
        for token in template.tokens() {
            match token.kind {
                TokenKind::Marker => {
                    let filled = self.slot(individual, &token.text, &mut consumed, path);
                    if !filled.is_empty() {
                        tokens.push(Token::word(filled));
                    }
                }
                _ => tokens.push(token.clone()),
            }
        }
        path.pop();
        untokenize(&tokens)
    }

    fn slot(&self, individual: usize, slot: &str, consumed: &mut Consumed, path: &mut Path) -> String {
        match slot {
            "Noun" => self.noun(individual),
            "Modifiers" => self.modifiers(individual),
            "AllProperties" => self.all_properties(individual, consumed, path),
            "ContainerName" => match self.individuals()[individual].container {
                Some((container, _)) => self.name_within(container, path),
                None => "unknown".into(),
            },
            _ => {
                if let Some(property) = self.find_property(individual, slot) {
                    consumed.properties.push(property);
                    return self
                        .value(individual, property)
                        .unwrap_or_else(|| "unknown".into());
                }
                if let Some((part, child)) = self.find_part(individual, slot) {
                    consumed.parts.push(part);
                    return self.description_within(child, path);
                }
                format!("<unknown property {slot}>")
            }
        }
    }

    /// "name: value" for every property and part not yet rendered.
    fn all_properties(&self, individual: usize, consumed: &Consumed, path: &mut Path) -> String {
        let ontology = self.ontology();
        let mut entries = Vec::new();
        for property in self.properties(individual) {
            if consumed.properties.contains(&property) {
                continue;
            }
            if let Some(value) = self.value(individual, property) {
                entries.push(format!(
                    "{}: {value}",
                    untokenize(&ontology.property(property).name)
                ));
            }
        }
        for (part, child) in self.parts(individual) {
            if !consumed.parts.contains(&part) {
                entries.push(format!(
                    "{}: {}",
                    untokenize(&ontology.part(part).name),
                    self.name_within(child, path)
                ));
            }
        }
        entries.join(", ")
    }

    /// Properties of every kind the individual turned out to be.
    fn properties(&self, individual: usize) -> Vec<PropertyId> {
        let mut properties = Vec::new();
        for kind in self.kinds(individual) {
            for property in &self.ontology().kind(kind).properties {
                if !properties.contains(property) {
                    properties.push(*property);
                }
            }
        }
        properties
    }

    /// Parts whose owning kind the individual turned out to be.
    fn parts(&self, individual: usize) -> Vec<(PartId, usize)> {
        self.individuals()[individual]
            .parts
            .iter()
            .filter(|(part, _)| self.is_a(individual, self.ontology().part(*part).owner))
            .copied()
            .collect()
    }

    fn find_property(&self, individual: usize, name: &str) -> Option<PropertyId> {
        self.properties(individual)
            .into_iter()
            .find(|p| untokenize(&self.ontology().property(*p).name).eq_ignore_ascii_case(name))
    }

    fn find_part(&self, individual: usize, name: &str) -> Option<(PartId, usize)> {
        self.parts(individual)
            .into_iter()
            .find(|(p, _)| untokenize(&self.ontology().part(*p).name).eq_ignore_ascii_case(name))
    }
}
