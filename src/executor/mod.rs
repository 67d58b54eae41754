pub mod pacstall;
