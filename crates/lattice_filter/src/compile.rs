//! Compile a requirement's attribute list into one matching filter.

use crate::expr::Filter;
use lattice_core::{Attribute, AttributeValue};

/// Compile attributes into a single boolean expression
///
/// Each attribute contributes one or two terms: a version range becomes a
/// lower-bound test (`>=`, or `NOT(<=)` when the floor is exclusive) plus
/// a mirrored upper-bound test when the range is bounded; a scalar becomes
/// an equality test; a text value containing `*` becomes a substring
/// match. Multiple terms combine with a single flat `And`; exactly one
/// term is returned unwrapped. An empty attribute list compiles to an
/// empty `And`, which matches everything.
#[must_use]
pub fn compile_attributes(attributes: &[Attribute]) -> Filter {
    let mut terms = Vec::new();

    for attr in attributes {
        match &attr.value {
            AttributeValue::Range(range) => {
                let floor = Filter::Gte {
                    key: attr.name.clone(),
                    value: range.floor.clone(),
                };
                terms.push(if range.floor_inclusive {
                    floor
                } else {
                    Filter::Not(Box::new(Filter::Lte {
                        key: attr.name.clone(),
                        value: range.floor.clone(),
                    }))
                });

                if let Some(ceiling) = &range.ceiling {
                    let cap = Filter::Lte {
                        key: attr.name.clone(),
                        value: ceiling.clone(),
                    };
                    terms.push(if range.ceiling_inclusive {
                        cap
                    } else {
                        Filter::Not(Box::new(Filter::Gte {
                            key: attr.name.clone(),
                            value: ceiling.clone(),
                        }))
                    });
                }
            }
            AttributeValue::Text(text) if text.contains('*') => {
                terms.push(Filter::substring(&attr.name, text));
            }
            value => {
                terms.push(Filter::Eq {
                    key: attr.name.clone(),
                    value: value.as_text(),
                });
            }
        }
    }

    if terms.len() == 1 {
        terms.pop().unwrap_or(Filter::And(Vec::new()))
    } else {
        Filter::And(terms)
    }
}
