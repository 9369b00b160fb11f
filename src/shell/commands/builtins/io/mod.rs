pub mod cat;
pub mod echo;
pub mod grep;
pub mod head;
pub mod sort;
pub mod tail;
pub mod wc;
