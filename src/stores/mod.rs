pub mod events;
pub mod offline_ranking;
pub mod similarity_index;
