mod layer_batch_norm;
mod layer_linear;
mod mode;
