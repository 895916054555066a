//! Multi-tick movement scenarios against small hand-built arenas

mod arena_scenarios;
