//! different utility modules used throughout the project
/// logger initialization and saving of solutions into csv
pub mod logger;
/// linspace and meshgrid
pub mod mesh;
/// tiny module to plot result of IVP computation and to prepare charts for fields
pub mod plots;
/// quiver plot primitive on plotters charts
pub mod quiver;
/// rendering options of quiver plots, parsed from "key: value" documents
pub mod quiver_options;
