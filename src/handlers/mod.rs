// handlers/mod.rs - two handler tiers
//
// Public (no auth) and Protected (claims required). The auth gate is applied
// to protected handlers when the route table is built, see `router`.
pub mod public;
pub mod protected;
