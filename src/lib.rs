//! Flat storage for many small sets of integers, grouped by an outer index.
//!
//! Algorithms that annotate each node of a large graph with structural data, such as
//! cut sets, neighborhoods, or support sets, create millions of tiny sets. Storing them
//! as `Vec<Vec<Vec<u32>>>` costs an allocation per set and a pointer chase per access.
//! Instead, [`Pages`] encodes every set as a self-describing record in one `Vec<u32>`,
//! and keeps two small arrays recording where each outer index's records begin and how
//! many there are. Reads go through borrowed views ([`SetRef`], [`Sets`]) that decode
//! records in place.
//!
//! ```
//! use paged_memory::Pages;
//!
//! // Two outer indices, each set carrying one extra value.
//! let mut pages = Pages::new(2, 1);
//! pages.assign_singleton(0, 7, &[100])?;
//! pages.append_begin(1)?;
//! pages.append_set(1, &[0, 2, 3], &[101])?;
//! pages.append_set(1, &[1, 3], &[102])?;
//!
//! assert_eq!(pages.count(1)?, 2);
//! for set in pages.sets(1)? {
//!     println!("{:?} labeled {}", set.elements(), set.extra(0)?);
//! }
//! # Ok::<(), paged_memory::PagesError>(())
//! ```

pub mod bytes;
pub mod common;
pub mod errors;
pub mod pages;
pub mod set;

pub use common::{HeapSize, Index, IterOwn, Len};
pub use errors::{PagesError, Result};
pub use pages::{Pages, PagesRef};
pub use set::{OwnedSet, SetRef, Sets};
