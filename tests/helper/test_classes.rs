//! Classes outside the standard catalog.

use castbench::class::Root;

castbench::class!(
    /// A class extending the shared root.
    Extra: Root, "X"
);

castbench::class!(
    /// Extends [`Extra`].
    ExtraChild: Extra, "Y"
);
