//! The library code for `blogcast`, which announces newly published blog
//! posts on social media from a CI pipeline. The work is split into two
//! pipeline steps so that the composed text can be reviewed (or dropped)
//! between them:
//!
//! 1. Preparing the announcement ([`build::prepare`]): the post source file
//!    is read ([`post`]), its public URL is derived ([`url`]), and the
//!    announcement text is composed within the platform's character limit
//!    ([`announce`]). The text is written as a step output ([`output`]).
//! 2. Publishing ([`build::publish`]): the text is posted through the social
//!    API ([`publish`]) with OAuth 1.0a-signed requests ([`oauth`]).
//!
//! Of the two, the first is where the interesting rules live: the title is
//! shortened so that the headline, title, URL (charged at a fixed shortened
//! length), and hashtags never exceed the limit.
//!
//! All environment and configuration-file access goes through [`config`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod announce;
pub mod build;
pub mod config;
pub mod oauth;
pub mod output;
pub mod post;
pub mod publish;
pub mod url;
