//! Attribute resolver.
//!
//! [`AttributeResolver`] collects sources and transforms, orders them with
//! the dependency graph and produces an [`AttributeSheet`]. Results are
//! cached until a new source or transform is registered.

use crate::attr_id::AttrId;
use crate::error::StatError;
use crate::graph::AttrGraph;
use crate::resolved::{AttributeSheet, ResolvedAttribute};
use crate::source::AttributeSource;
use crate::transform::AttributeTransform;
use std::collections::{BTreeMap, HashMap};

/// Resolves attributes from registered sources and transforms.
///
/// 1. Sources are summed per attribute, in registration order.
/// 2. Transforms are applied per attribute, in registration order, after
///    every attribute they depend on.
///
/// # Examples
///
/// ```rust
/// use xianlu::resolver::AttributeResolver;
/// use xianlu::source::{MapSource, SourceKind};
/// use xianlu::transform::ScalingTransform;
/// use xianlu::AttrId;
///
/// let atk = AttrId::from_str("攻击力");
/// let power = AttrId::from_str("战斗力");
///
/// let mut base = MapSource::empty(SourceKind::Base);
/// base.insert(atk.clone(), 100.0);
///
/// let mut resolver = AttributeResolver::new();
/// resolver.register_source(Box::new(base));
/// resolver.register_transform(power.clone(), Box::new(ScalingTransform::new(atk, 1.5)));
///
/// let resolved = resolver.resolve(&power).unwrap();
/// assert_eq!(resolved.value, 150.0);
/// ```
#[derive(Default)]
pub struct AttributeResolver {
    sources: Vec<Box<dyn AttributeSource>>,
    transforms: BTreeMap<AttrId, Vec<Box<dyn AttributeTransform>>>,
    cache: Option<AttributeSheet>,
}

impl AttributeResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. It contributes to every attribute it carries.
    pub fn register_source(&mut self, source: Box<dyn AttributeSource>) {
        self.sources.push(source);
        self.cache = None;
    }

    /// Register a transform for `attr`.
    pub fn register_transform(&mut self, attr: AttrId, transform: Box<dyn AttributeTransform>) {
        self.transforms.entry(attr).or_default().push(transform);
        self.cache = None;
    }

    /// Resolve a single attribute (and everything it depends on).
    pub fn resolve(&mut self, attr: &AttrId) -> Result<ResolvedAttribute, StatError> {
        let sheet = self.resolve_all()?;
        Ok(sheet
            .breakdown(attr.as_str())
            .cloned()
            .unwrap_or_else(|| ResolvedAttribute::new(attr.clone(), 0.0)))
    }

    /// Resolve every attribute touched by a source or a transform.
    pub fn resolve_all(&mut self) -> Result<&AttributeSheet, StatError> {
        if self.cache.is_none() {
            let sheet = self.compute()?;
            self.cache = Some(sheet);
        }
        Ok(&*self.cache.get_or_insert_with(AttributeSheet::new))
    }

    fn build_graph(&self) -> AttrGraph {
        let mut graph = AttrGraph::new();
        for source in &self.sources {
            for attr in source.attributes() {
                graph.add_node(attr);
            }
        }
        for (attr, transforms) in &self.transforms {
            graph.add_node(attr.clone());
            for transform in transforms {
                for dep in transform.depends_on() {
                    graph.add_edge(attr.clone(), dep);
                }
            }
        }
        graph
    }

    fn compute(&self) -> Result<AttributeSheet, StatError> {
        let order = self.build_graph().topological_sort()?;
        let mut sheet = AttributeSheet::new();
        for attr in order {
            let resolved = self.resolve_one(&attr, &sheet)?;
            sheet.insert(resolved);
        }
        Ok(sheet)
    }

    fn resolve_one(
        &self,
        attr: &AttrId,
        resolved_so_far: &AttributeSheet,
    ) -> Result<ResolvedAttribute, StatError> {
        let mut resolved = ResolvedAttribute::new(attr.clone(), 0.0);

        let mut value = 0.0;
        for source in &self.sources {
            if let Some(contribution) = source.get_value(attr) {
                value += contribution;
                resolved.add_source(source.kind(), contribution);
            }
        }

        if let Some(transforms) = self.transforms.get(attr) {
            for transform in transforms {
                let mut dependencies = HashMap::new();
                for dep in transform.depends_on() {
                    let dep_value = resolved_so_far
                        .breakdown(dep.as_str())
                        .map(|r| r.value)
                        .ok_or_else(|| StatError::MissingDependency(dep.clone()))?;
                    dependencies.insert(dep, dep_value);
                }
                value = transform.apply(value, &dependencies)?;
                resolved.add_transform(transform.description(), value);
            }
        }

        resolved.value = value;
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MapSource, SourceKind};
    use crate::transform::ScalingTransform;

    fn id(s: &str) -> AttrId {
        AttrId::from_str(s)
    }

    fn source(kind: SourceKind, values: &[(&str, f64)]) -> Box<MapSource> {
        let mut map = MapSource::empty(kind);
        for (attr, v) in values {
            map.insert(id(attr), *v);
        }
        Box::new(map)
    }

    #[test]
    fn test_sources_are_summed_in_order() {
        let mut resolver = AttributeResolver::new();
        resolver.register_source(source(SourceKind::Base, &[("攻击力", 100.0)]));
        resolver.register_source(source(
            SourceKind::Equipment("青锋剑".into()),
            &[("攻击力", 30.0)],
        ));
        resolver.register_source(source(SourceKind::Sect("青云门".into()), &[("攻击力", 5.0)]));

        let atk = resolver.resolve(&id("攻击力")).unwrap();
        assert_eq!(atk.value, 135.0);
        assert_eq!(atk.sources.len(), 3);
        assert_eq!(atk.sources[0].0, SourceKind::Base);
        assert_eq!(atk.sources[2].0, SourceKind::Sect("青云门".into()));
    }

    #[test]
    fn test_unknown_attribute_resolves_to_zero() {
        let mut resolver = AttributeResolver::new();
        resolver.register_source(source(SourceKind::Base, &[("攻击力", 100.0)]));
        let luck = resolver.resolve(&id("幸运值")).unwrap();
        assert_eq!(luck.value, 0.0);
        assert!(luck.sources.is_empty());
    }

    #[test]
    fn test_derived_attribute_without_dependency_source() {
        let mut resolver = AttributeResolver::new();
        resolver.register_transform(
            id("战斗力"),
            Box::new(ScalingTransform::new(id("暴击率"), 10.0)),
        );
        let power = resolver.resolve(&id("战斗力")).unwrap();
        assert_eq!(power.value, 0.0);
        assert_eq!(power.transforms.len(), 1);
    }

    #[test]
    fn test_cache_is_invalidated_on_register() {
        let mut resolver = AttributeResolver::new();
        resolver.register_source(source(SourceKind::Base, &[("速度", 100.0)]));
        assert_eq!(resolver.resolve_all().unwrap().get("速度"), 100.0);

        resolver.register_source(source(SourceKind::Sect("青云门".into()), &[("速度", 20.0)]));
        assert_eq!(resolver.resolve_all().unwrap().get("速度"), 120.0);
    }

    #[test]
    fn test_cycle_detection() {
        let mut resolver = AttributeResolver::new();
        resolver.register_transform(id("A"), Box::new(ScalingTransform::new(id("B"), 1.0)));
        resolver.register_transform(id("B"), Box::new(ScalingTransform::new(id("A"), 1.0)));

        assert!(matches!(
            resolver.resolve(&id("A")),
            Err(StatError::Cycle { .. })
        ));
    }
}
