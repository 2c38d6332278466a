use bevy::prelude::*;
use forge_core::GeneratorConfig;
use forge_procgen::Universe;

/// Viewer lifecycle: generating in the background, then browsing the result
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Loading,
    Viewing,
}

/// What to generate next and how much of it to draw
#[derive(Resource, Debug, Clone)]
pub struct ViewerSettings {
    pub config: GeneratorConfig,
    /// Upper bound on spawned particle entities
    pub render_budget: usize,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            config: GeneratorConfig {
                seed: Some(42),
                ..GeneratorConfig::default()
            },
            render_budget: 20_000,
        }
    }
}

impl ViewerSettings {
    /// Advance to the next seed for a regeneration
    pub fn advance_seed(&mut self) -> u64 {
        let next = self.config.seed.map_or(0, |s| s.wrapping_add(1));
        self.config.seed = Some(next);
        next
    }
}

/// The universe currently on screen (None until the first generation lands)
#[derive(Resource, Default)]
pub struct UniverseView {
    pub universe: Option<Universe>,
    /// Bumped on every new universe
    pub generation: u64,
}

impl UniverseView {
    pub fn replace(&mut self, universe: Universe) {
        self.universe = Some(universe);
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_seed() {
        let mut settings = ViewerSettings::default();
        assert_eq!(settings.advance_seed(), 43);
        assert_eq!(settings.config.seed, Some(43));

        settings.config.seed = None;
        assert_eq!(settings.advance_seed(), 0);

        settings.config.seed = Some(u64::MAX);
        assert_eq!(settings.advance_seed(), 0);
    }
}
