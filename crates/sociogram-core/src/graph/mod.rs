pub mod gml;
pub mod layout;
pub mod social_graph;
