pub mod npm_tree;

pub use npm_tree::NpmTreeOracle;
