// Services over the two work-order tables: the normalizer that cleans them
// and the dashboard computations that consume the cleaned result.
pub mod dashboard;
pub mod normalizer;
