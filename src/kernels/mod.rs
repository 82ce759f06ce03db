// kernels/ — Reference computations run through the strategies.
//
//   blur       stencil: reads a W×W neighbourhood, clamped at the edges
//   grayscale  pure per-pixel map, runs in place
//   julia      escape-time iteration, data-dependent trip count
//   dft        all-pairs: every work item reads the whole input
//   vector     element-wise Float4 arithmetic over a 1-D domain

pub mod blur;
pub mod dft;
pub mod grayscale;
pub mod julia;
pub mod vector;
