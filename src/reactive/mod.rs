/// Reactive binding model: controls → derivations → render slots.
///
/// ```text
///   set(id, value)
///        │
///        ▼
///   ┌──────────────┐  clamp numbers, refuse foreign options
///   │   controls    │
///   └──────────────┘
///        │ subscribers of `id`, registration order
///        ▼
///   ┌──────────────┐  snapshot inputs → derive → Artifact
///   │   binding     │
///   └──────────────┘
///        │
///        ▼
///   ┌──────────────┐  replace slot content
///   │   render      │
///   └──────────────┘
/// ```

pub mod binding;
pub mod controls;
pub mod render;
