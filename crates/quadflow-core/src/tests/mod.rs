/*! Solver and analysis tests over small hand-built graphs.
 *
 * Each analysis gets straight-line, branching and looping methods whose fixpoints are
 * small enough to check by hand.
 */

#![allow(unused_imports)]

mod faintness_tests;
mod liveness_tests;
mod null_check_tests;
