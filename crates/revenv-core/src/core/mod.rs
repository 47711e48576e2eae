pub mod layout;
pub mod links;
pub mod outcome;
pub mod process;
pub mod pyc;
pub mod reinit;
pub mod relocate;
pub mod report;
pub mod scripts;
