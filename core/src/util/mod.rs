mod sync;

pub use sync::lock_unpoisoned;
