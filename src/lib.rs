//! # Particle Morph
//!
//! A scroll-driven particle morph engine. A fixed population of particles is
//! interpolated between point sets sampled from the surfaces of triangle meshes,
//! and scroll position decides which shape the particles are heading to.
//!
//! ## Pipeline
//!
//! - **Sampling**: area-weighted uniform sampling turns each mesh into exactly N points
//! - **Registry**: every shape (models plus a random cloud) shares the same N
//! - **Morph**: one eased tween per particle, later requests supersede earlier ones
//! - **Scroll**: ordered trigger regions fire enter/leave-back transitions exactly once per crossing
//!
//! ### Example
//!
//! ```ignore
//! use particle_morph::scene::MorphScene;
//!
//! let mut scene = runtime.block_on(MorphScene::load(&loader, &config))?;
//! scene.frame(scroll_y, 1.0 / 60.0);
//! if scene.take_dirty() {
//!     upload(scene.buffer().as_bytes());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Engine runner, ECS systems and errors
//! - [`config`]: TOML/JSON configuration
//! - [`geometry`]: Triangle meshes, point sets and the surface sampler
//! - [`animation`]: Easing curves and the tween interpolator
//! - [`particles`]: Particle buffer, shape registry and morph controller
//! - [`scroll`]: Trigger anchors and the scroll state machine
//! - [`resources`]: Asynchronous mesh loading
//! - [`scene`]: The assembled per-frame scene

/// Core engine functionality including the headless runner and ECS systems
pub mod core;
/// Configuration system
pub mod config;
/// Mesh geometry and surface sampling
pub mod geometry;
/// Easing and per-key tweening
pub mod animation;
/// Particle buffer, shape registry and morph controller
pub mod particles;
/// Scroll triggers and region state machine
pub mod scroll;
/// Asynchronous mesh loading
pub mod resources;
/// Scene assembly
pub mod scene;
