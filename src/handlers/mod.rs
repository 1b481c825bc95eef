// handlers/mod.rs - Tiered handler architecture
//
// Protected (JWT auth + workspace resolution) → Elevated (superuser).
// Public endpoints (/, /health) live in main.rs and never see a context.

pub mod elevated; // Superuser administration (/api/root/*)
pub mod protected; // JWT authentication required (/api/*)
