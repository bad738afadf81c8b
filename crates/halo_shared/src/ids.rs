//! Opaque handles.
//!
//! Every resource the compositor touches on the host side is referenced
//! through one of these newtypes. Hosts choose the numbering for their own
//! objects; derived meshes issued by the compositor carry [`MeshId::DERIVED_BIT`].

use serde::{Deserialize, Serialize};

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub $inner);

        impl $name {
            /// Raw value
            #[must_use]
            pub const fn raw(self) -> $inner {
                self.0
            }
        }
    };
}

define_handle!(
    /// Scene node (transform) identity.
    NodeId(u64)
);
define_handle!(
    /// Renderer component identity.
    RendererId(u64)
);
define_handle!(
    /// Camera identity.
    CameraId(u64)
);
define_handle!(
    /// Mesh identity, host-issued or derived.
    MeshId(u64)
);
define_handle!(
    /// Forked material instance.
    MaterialHandle(u64)
);
define_handle!(
    /// Texture resource.
    TextureHandle(u64)
);
define_handle!(
    /// Temporary render target slot.
    RenderTargetHandle(u32)
);
define_handle!(
    /// Highlight effect instance inside a context.
    EffectId(u64)
);

impl MeshId {
    /// Marks ids issued by the geometry cache.
    pub const DERIVED_BIT: u64 = 1 << 63;

    /// Id for the `seq`-th derived mesh.
    #[must_use]
    pub const fn derived(seq: u64) -> Self {
        Self(seq | Self::DERIVED_BIT)
    }

    /// True for cache-issued meshes.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        self.0 & Self::DERIVED_BIT != 0
    }
}
