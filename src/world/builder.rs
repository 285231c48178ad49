use std::sync::Arc;

use crate::{Error, Result, RuleCatalog, State, Storage, World, WorldConfig};

/// Collects the configuration of a world one setting at a time.
#[derive(Default)]
pub struct WorldBuilder {
    name: Option<String>,
    width: Option<usize>,
    height: Option<usize>,
    rules: Option<Arc<RuleCatalog>>,
    initial_state: Option<State>,
    storage: Option<Box<dyn Storage>>,
}

impl WorldBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: usize) -> Self {
        self.height = Some(height);
        self
    }

    pub fn rules(mut self, rules: Arc<RuleCatalog>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn initial_state(mut self, state: impl Into<State>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Allocates the world with every cell set to the initial state.
    pub fn init(self) -> Result<World> {
        let missing = |field: &str| Error::config(format!("`{field}` must be set before init"));
        let config = WorldConfig {
            name: self.name,
            width: self.width.ok_or_else(|| missing("width"))?,
            height: self.height.ok_or_else(|| missing("height"))?,
            rules: self.rules.ok_or_else(|| missing("rules"))?,
            initial_state: self.initial_state.ok_or_else(|| missing("initial_state"))?,
            storage: self.storage,
        };
        World::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogs::{self, ALIVE, EMPTY};

    #[test]
    fn every_required_field_is_checked() {
        let life = Arc::new(catalogs::life());
        let complete = || {
            World::builder()
                .width(3)
                .height(2)
                .rules(life.clone())
                .initial_state(EMPTY)
        };
        let world = complete().init().unwrap();
        assert_eq!((world.width(), world.height()), (3, 2));
        assert_eq!(world.population(EMPTY), 6);

        let partial = [
            (WorldBuilder::default().height(2).rules(life.clone()).initial_state(EMPTY), "width"),
            (WorldBuilder::default().width(3).rules(life.clone()).initial_state(EMPTY), "height"),
            (WorldBuilder::default().width(3).height(2).initial_state(EMPTY), "rules"),
            (WorldBuilder::default().width(3).height(2).rules(life.clone()), "initial_state"),
        ];
        for (builder, field) in partial {
            match builder.init() {
                Err(Error::Configuration(message)) => assert!(message.contains(field), "{message}"),
                other => panic!("expected a configuration error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_values_are_rejected() {
        let life = Arc::new(catalogs::life());
        let zero = World::builder()
            .width(0)
            .height(4)
            .rules(life.clone())
            .initial_state(ALIVE)
            .init();
        assert!(matches!(zero, Err(Error::Configuration(_))));

        let foreign = World::builder()
            .width(4)
            .height(4)
            .rules(life)
            .initial_state('h')
            .init();
        assert!(matches!(foreign, Err(Error::UnknownState { .. })));
    }

    #[test]
    fn name_is_optional() {
        let build = |builder: WorldBuilder| {
            builder
                .width(2)
                .height(2)
                .rules(Arc::new(catalogs::life()))
                .initial_state(EMPTY)
                .init()
                .unwrap()
        };
        assert_eq!(build(World::builder()).name(), None);

        let named = build(World::builder().name("petri"));
        assert_eq!(named.name(), Some("petri"));
        assert!(format!("{named:?}").contains("\"petri\""));
    }
}
