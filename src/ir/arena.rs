use indexmap::IndexMap;

use super::{Type, TypeReference};

/// Named shapes addressed by name; the target side of every
/// [`TypeReference`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeArena {
    entries: IndexMap<String, Type>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ty` under `name`. The first definition of a name wins; a
    /// later, different one is dropped with a warning.
    pub fn define(&mut self, name: impl Into<String>, ty: Type) -> TypeReference {
        let name = name.into();
        match self.entries.get(&name) {
            Some(existing) if *existing != ty => {
                log::warn!("type `{name}` is already declared, keeping the first declaration");
            }
            Some(_) => {}
            None => {
                self.entries.insert(name.clone(), ty);
            }
        }
        TypeReference { name }
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Follows alias chains (`A -> B -> shape`) to the first non-reference
    /// target. `None` for dangling names and alias cycles.
    pub fn resolve(&self, name: &str) -> Option<&Type> {
        let mut current = name;
        for _ in 0..=self.entries.len() {
            match self.entries.get(current)? {
                Type::TypeReference(next) => current = &next.name,
                target => return Some(target),
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites every entry in place, keeping names and order.
    pub fn map_in_place(&mut self, f: impl Fn(&Type) -> Type) {
        for ty in self.entries.values_mut() {
            *ty = f(ty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_definition_wins() {
        let mut arena = TypeArena::new();
        arena.define("Pet", Type::string());
        let reference = arena.define("Pet", Type::number());
        assert_eq!(reference.name, "Pet");
        assert_eq!(arena.get("Pet"), Some(&Type::string()));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn resolve_walks_aliases_and_stops_on_cycles() {
        let mut arena = TypeArena::new();
        arena.define("Pets", Type::array(Type::reference("Pet")));
        arena.define("AlsoPets", Type::reference("Pets"));
        arena.define("A", Type::reference("B"));
        arena.define("B", Type::reference("A"));
        assert_eq!(arena.resolve("AlsoPets"), Some(&Type::array(Type::reference("Pet"))));
        assert_eq!(arena.resolve("A"), None);
        assert_eq!(arena.resolve("Nope"), None);
    }
}
