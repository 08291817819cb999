//! # skyward
//!
//! Sky-pointing core for augmented-reality star charts.
//!
//! Given a star catalog, the observer's location and compass heading, and the
//! direction the user is looking, `skyward` works out where every catalog object
//! sits in the observer's local sky and which named region (constellation) the
//! user is gazing at.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use skyward::{
//!     CelestialObject, GazeEvent, ObserverSample, RegionFigure, SessionConfig, SkyCatalog,
//!     SkySession, Vector3,
//! };
//!
//! // Betelgeuse, Bellatrix, Rigel and Saiph
//! let objects = vec![
//!     CelestialObject::from_degrees(27989, 88.793, 7.407, 0.45, 1.50).with_name("Betelgeuse"),
//!     CelestialObject::from_degrees(25336, 81.283, 6.350, 1.64, -0.22).with_name("Bellatrix"),
//!     CelestialObject::from_degrees(24436, 78.634, -8.202, 0.18, -0.03).with_name("Rigel"),
//!     CelestialObject::from_degrees(27366, 86.939, -9.670, 2.07, -0.17).with_name("Saiph"),
//! ];
//! let figures = vec![RegionFigure::new(
//!     "Ori",
//!     "Orion",
//!     vec![[27989, 25336], [25336, 24436], [24436, 27366], [27366, 27989]],
//! )];
//! let catalog = Arc::new(SkyCatalog::build(objects, figures, Some(6.5)).unwrap());
//!
//! let mut session = SkySession::new(catalog, SessionConfig::default(), Utc::now()).unwrap();
//! let feed = session.sample_sender();
//! feed.send(ObserverSample::Position { latitude_deg: 48.2, longitude_deg: 16.4, at: Utc::now() })
//!     .unwrap();
//! feed.send(ObserverSample::Heading { degrees: 180.0 }).unwrap();
//!
//! // Once per frame: device-frame gaze direction (here: straight ahead, 30° up)
//! let look = Vector3::new(0.0, 0.5, -(0.75_f64).sqrt());
//! if let Some(GazeEvent::Selected { code }) = session.tick(1.0 / 60.0, Utc::now(), Some(&look)) {
//!     println!("Looking at {code}");
//! }
//! for p in session.engine().visible() {
//!     println!("{} at alt {:.1}°", p.id, p.alt_rad.to_degrees());
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Observer tracking** ([`ObserverTracker`]): raw GPS and compass samples,
//!    heading smoothing along the short arc, local sidereal time
//! 2. **Positions** ([`PositionEngine`]): equatorial to horizontal to Cartesian for
//!    every catalog object, plus colour, opacity and size from B−V and magnitude
//! 3. **Gaze matching** ([`GazeMatcher`]): nearest region centroid within a
//!    threshold, confirmed after a dwell time
//!
//! [`SkySession`] runs all three on a per-frame tick.

pub mod astro;
mod catalog;
pub mod gaze;
mod object;
pub mod observer;
pub mod positions;
mod region;
pub mod session;

pub use catalog::*;
pub use gaze::{GazeConfig, GazeEvent, GazeMatcher, GazeState, RegionHit, SelectionInput};
pub use object::*;
pub use observer::{ObserverSample, ObserverState, ObserverTracker};
pub use positions::{ComputedPosition, PositionEngine};
pub use region::*;
pub use session::{GeoLocation, SessionConfig, SkySession};

/// Cartesian direction or position. All sky math runs in 64-bit floats.
pub type Vector3 = nalgebra::Vector3<f64>;
