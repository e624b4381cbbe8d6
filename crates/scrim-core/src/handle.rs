// Author: Dustin Pilgrim
// License: MIT

use serde::{Deserialize, Serialize};

/// Non-owning reference to a host surface.
///
/// The handle only names the surface; whoever holds it never keeps the
/// surface alive. Ask the host for the current box every time it is needed,
/// the referent may be gone by then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorHandle(pub u64);

/// Host token for the popup's content surface (used for z-ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceToken(pub u64);
