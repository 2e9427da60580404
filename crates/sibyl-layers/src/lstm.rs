//! LSTM layer implementation.
//!
//! This module provides the [`Lstm`] layer, a recurrent layer over
//! `[batch, seq_len, input_dim]` sequences with full backpropagation
//! through time.
//!
//! The forward pass computes, for each time step:
//! - i_t = sigmoid(x_t @ W_xi + h_{t-1} @ W_hi + b_i)  (input gate)
//! - f_t = sigmoid(x_t @ W_xf + h_{t-1} @ W_hf + b_f)  (forget gate)
//! - g_t = tanh(x_t @ W_xg + h_{t-1} @ W_hg + b_g)     (cell candidate)
//! - o_t = sigmoid(x_t @ W_xo + h_{t-1} @ W_ho + b_o)  (output gate)
//! - c_t = f_t * c_{t-1} + i_t * g_t
//! - h_t = o_t * tanh(c_t)

use crate::error::LayerError;
use crate::layer::Layer;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// An LSTM layer.
///
/// In sequence mode (`with_return_sequences(true)`) the layer emits the
/// hidden state at every time step, `[batch, seq_len, hidden_dim]`, so
/// further recurrent layers can be stacked on top. Otherwise it emits only
/// the final hidden state, `[batch, hidden_dim]`.
///
/// # Example
///
/// ```
/// use sibyl_layers::lstm::Lstm;
/// use sibyl_layers::layer::Layer;
/// use sibyl_layers::tensor::Tensor;
///
/// let lstm = Lstm::new(1, 50, 42);
/// let input = Tensor::zeros(&[8, 60, 1]); // batch=8, seq_len=60
/// let output = lstm.forward(&input).unwrap();
/// assert_eq!(output.shape(), &[8, 50]); // final hidden state
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lstm {
    /// Input dimension
    input_dim: usize,
    /// Hidden dimension
    hidden_dim: usize,
    /// Whether to emit the full hidden sequence instead of the last state
    return_sequences: bool,
    /// Input gate weights for input
    w_xi: Tensor,
    /// Input gate weights for hidden state
    w_hi: Tensor,
    /// Input gate bias
    b_i: Tensor,
    /// Forget gate weights for input
    w_xf: Tensor,
    /// Forget gate weights for hidden state
    w_hf: Tensor,
    /// Forget gate bias
    b_f: Tensor,
    /// Cell candidate weights for input
    w_xg: Tensor,
    /// Cell candidate weights for hidden state
    w_hg: Tensor,
    /// Cell candidate bias
    b_g: Tensor,
    /// Output gate weights for input
    w_xo: Tensor,
    /// Output gate weights for hidden state
    w_ho: Tensor,
    /// Output gate bias
    b_o: Tensor,
    /// Cached values for backward pass
    #[serde(skip)]
    cache: Option<LstmCache>,
    /// Parameter gradients from the most recent backward pass
    #[serde(skip)]
    grads: Option<Vec<Tensor>>,
}

/// Cached values from an LSTM training forward pass.
#[derive(Debug, Clone)]
struct LstmCache {
    /// Input sequence [batch, seq, input_dim]
    inputs: Tensor,
    /// Hidden states h_0..h_T (h_0 is zeros), length seq + 1
    hidden: Vec<Tensor>,
    /// Cell states c_0..c_T (c_0 is zeros), length seq + 1
    cell: Vec<Tensor>,
    /// Input gate activations per step
    input_gates: Vec<Tensor>,
    /// Forget gate activations per step
    forget_gates: Vec<Tensor>,
    /// Cell candidate activations per step
    candidates: Vec<Tensor>,
    /// Output gate activations per step
    output_gates: Vec<Tensor>,
}

fn sigmoid(t: &Tensor) -> Tensor {
    t.map(|v| 1.0 / (1.0 + (-v).exp()))
}

fn tanh(t: &Tensor) -> Tensor {
    t.map(|v| v.tanh())
}

impl Lstm {
    /// Creates a new LSTM layer emitting only the final hidden state.
    ///
    /// Weights are drawn uniformly from `[-1/sqrt(hidden), 1/sqrt(hidden))`
    /// using the given seed. The forget gate bias is initialized to 1.0 so
    /// early training does not erase the cell state.
    pub fn new(input_dim: usize, hidden_dim: usize, seed: u64) -> Self {
        let limit = (1.0 / hidden_dim as f32).sqrt();
        let xs = &[input_dim, hidden_dim];
        let hs = &[hidden_dim, hidden_dim];

        Self {
            input_dim,
            hidden_dim,
            return_sequences: false,
            w_xi: Tensor::rand_uniform(xs, limit, seed),
            w_hi: Tensor::rand_uniform(hs, limit, seed.wrapping_add(1)),
            b_i: Tensor::zeros(&[hidden_dim]),
            w_xf: Tensor::rand_uniform(xs, limit, seed.wrapping_add(2)),
            w_hf: Tensor::rand_uniform(hs, limit, seed.wrapping_add(3)),
            b_f: Tensor::ones(&[hidden_dim]),
            w_xg: Tensor::rand_uniform(xs, limit, seed.wrapping_add(4)),
            w_hg: Tensor::rand_uniform(hs, limit, seed.wrapping_add(5)),
            b_g: Tensor::zeros(&[hidden_dim]),
            w_xo: Tensor::rand_uniform(xs, limit, seed.wrapping_add(6)),
            w_ho: Tensor::rand_uniform(hs, limit, seed.wrapping_add(7)),
            b_o: Tensor::zeros(&[hidden_dim]),
            cache: None,
            grads: None,
        }
    }

    /// Switches the layer into or out of sequence mode.
    pub fn with_return_sequences(mut self, return_sequences: bool) -> Self {
        self.return_sequences = return_sequences;
        self
    }

    /// Returns the input dimension.
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Returns the hidden dimension.
    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Returns whether the layer emits the full hidden sequence.
    pub fn returns_sequences(&self) -> bool {
        self.return_sequences
    }

    fn check_input(&self, input: &Tensor) -> Result<(usize, usize), LayerError> {
        if input.ndim() != 3 {
            return Err(LayerError::ForwardError {
                message: format!(
                    "Lstm expects 3D input [batch, seq, dim], got {}D",
                    input.ndim()
                ),
            });
        }
        let batch_size = input.shape()[0];
        let seq_len = input.shape()[1];
        if input.shape()[2] != self.input_dim {
            return Err(LayerError::InvalidInputDimension {
                expected: self.input_dim,
                actual: input.shape()[2],
            });
        }
        if seq_len == 0 {
            return Err(LayerError::ForwardError {
                message: "Lstm input sequence is empty".to_string(),
            });
        }
        Ok((batch_size, seq_len))
    }

    /// Extracts a single timestep from the input tensor as `[batch, dim]`.
    fn extract_timestep(input: &Tensor, t: usize) -> Tensor {
        let batch_size = input.shape()[0];
        let seq_len = input.shape()[1];
        let dim = input.shape()[2];
        let mut data = vec![0.0; batch_size * dim];

        for b in 0..batch_size {
            for d in 0..dim {
                data[b * dim + d] = input.data()[b * seq_len * dim + t * dim + d];
            }
        }

        Tensor::from_data(&[batch_size, dim], data)
    }

    /// Writes a `[batch, dim]` tensor into timestep `t` of `out`.
    fn write_timestep(out: &mut Tensor, t: usize, step: &Tensor) {
        let batch_size = out.shape()[0];
        let seq_len = out.shape()[1];
        let dim = out.shape()[2];

        for b in 0..batch_size {
            for d in 0..dim {
                out.data_mut()[b * seq_len * dim + t * dim + d] = step.data()[b * dim + d];
            }
        }
    }

    fn step(
        &self,
        x_t: &Tensor,
        h_prev: &Tensor,
        c_prev: &Tensor,
    ) -> (Tensor, Tensor, Tensor, Tensor, Tensor, Tensor) {
        let i_t = sigmoid(&x_t.matmul(&self.w_xi).add(&h_prev.matmul(&self.w_hi)).add(&self.b_i));
        let f_t = sigmoid(&x_t.matmul(&self.w_xf).add(&h_prev.matmul(&self.w_hf)).add(&self.b_f));
        let g_t = tanh(&x_t.matmul(&self.w_xg).add(&h_prev.matmul(&self.w_hg)).add(&self.b_g));
        let o_t = sigmoid(&x_t.matmul(&self.w_xo).add(&h_prev.matmul(&self.w_ho)).add(&self.b_o));

        let c_t = f_t.mul(c_prev).add(&i_t.mul(&g_t));
        let h_t = o_t.mul(&tanh(&c_t));

        (i_t, f_t, g_t, o_t, c_t, h_t)
    }

    fn output_from(&self, hidden: &[Tensor], batch_size: usize, seq_len: usize) -> Tensor {
        if self.return_sequences {
            let mut out = Tensor::zeros(&[batch_size, seq_len, self.hidden_dim]);
            for t in 0..seq_len {
                Self::write_timestep(&mut out, t, &hidden[t + 1]);
            }
            out
        } else {
            hidden[seq_len].clone()
        }
    }
}

impl Layer for Lstm {
    fn forward(&self, input: &Tensor) -> Result<Tensor, LayerError> {
        let (batch_size, seq_len) = self.check_input(input)?;

        let mut h = Tensor::zeros(&[batch_size, self.hidden_dim]);
        let mut c = Tensor::zeros(&[batch_size, self.hidden_dim]);
        let mut hidden = Vec::with_capacity(seq_len + 1);
        hidden.push(h.clone());

        for t in 0..seq_len {
            let x_t = Self::extract_timestep(input, t);
            let (_, _, _, _, c_t, h_t) = self.step(&x_t, &h, &c);
            h = h_t;
            c = c_t;
            hidden.push(h.clone());
        }

        Ok(self.output_from(&hidden, batch_size, seq_len))
    }

    fn forward_train(&mut self, input: &Tensor) -> Result<Tensor, LayerError> {
        let (batch_size, seq_len) = self.check_input(input)?;

        let mut hidden = Vec::with_capacity(seq_len + 1);
        let mut cell = Vec::with_capacity(seq_len + 1);
        hidden.push(Tensor::zeros(&[batch_size, self.hidden_dim]));
        cell.push(Tensor::zeros(&[batch_size, self.hidden_dim]));

        let mut input_gates = Vec::with_capacity(seq_len);
        let mut forget_gates = Vec::with_capacity(seq_len);
        let mut candidates = Vec::with_capacity(seq_len);
        let mut output_gates = Vec::with_capacity(seq_len);

        for t in 0..seq_len {
            let x_t = Self::extract_timestep(input, t);
            let (i_t, f_t, g_t, o_t, c_t, h_t) = self.step(&x_t, &hidden[t], &cell[t]);

            input_gates.push(i_t);
            forget_gates.push(f_t);
            candidates.push(g_t);
            output_gates.push(o_t);
            hidden.push(h_t);
            cell.push(c_t);
        }

        let output = self.output_from(&hidden, batch_size, seq_len);
        self.cache = Some(LstmCache {
            inputs: input.clone(),
            hidden,
            cell,
            input_gates,
            forget_gates,
            candidates,
            output_gates,
        });
        Ok(output)
    }

    fn backward(&mut self, grad: &Tensor) -> Result<Tensor, LayerError> {
        let cache = self.cache.as_ref().ok_or(LayerError::NotInitialized)?;

        let batch_size = cache.inputs.shape()[0];
        let seq_len = cache.inputs.shape()[1];

        let expected: Vec<usize> = if self.return_sequences {
            vec![batch_size, seq_len, self.hidden_dim]
        } else {
            vec![batch_size, self.hidden_dim]
        };
        if grad.shape() != expected.as_slice() {
            return Err(LayerError::ShapeMismatch {
                expected,
                actual: grad.shape().to_vec(),
            });
        }

        let xs = &[self.input_dim, self.hidden_dim];
        let hs = &[self.hidden_dim, self.hidden_dim];
        let bs = &[self.hidden_dim];
        let mut dw_xi = Tensor::zeros(xs);
        let mut dw_hi = Tensor::zeros(hs);
        let mut db_i = Tensor::zeros(bs);
        let mut dw_xf = Tensor::zeros(xs);
        let mut dw_hf = Tensor::zeros(hs);
        let mut db_f = Tensor::zeros(bs);
        let mut dw_xg = Tensor::zeros(xs);
        let mut dw_hg = Tensor::zeros(hs);
        let mut db_g = Tensor::zeros(bs);
        let mut dw_xo = Tensor::zeros(xs);
        let mut dw_ho = Tensor::zeros(hs);
        let mut db_o = Tensor::zeros(bs);

        let mut dx = Tensor::zeros(cache.inputs.shape());
        let mut dh_next = Tensor::zeros(&[batch_size, self.hidden_dim]);
        let mut dc_next = Tensor::zeros(&[batch_size, self.hidden_dim]);

        for t in (0..seq_len).rev() {
            // Gradient flowing into h_t from the layer output.
            let dh_out = if self.return_sequences {
                Self::extract_timestep(grad, t)
            } else if t == seq_len - 1 {
                grad.clone()
            } else {
                Tensor::zeros(&[batch_size, self.hidden_dim])
            };
            let dh = dh_next.add(&dh_out);

            let i_t = &cache.input_gates[t];
            let f_t = &cache.forget_gates[t];
            let g_t = &cache.candidates[t];
            let o_t = &cache.output_gates[t];
            let c_t = &cache.cell[t + 1];
            let c_prev = &cache.cell[t];
            let h_prev = &cache.hidden[t];
            let x_t = Self::extract_timestep(&cache.inputs, t);

            let tanh_c = tanh(c_t);

            // h_t = o_t * tanh(c_t)
            let do_pre = dh.mul(&tanh_c).mul(&o_t.map(|v| v * (1.0 - v)));
            let dc = dc_next.add(&dh.mul(o_t).mul(&tanh_c.map(|v| 1.0 - v * v)));

            // c_t = f_t * c_{t-1} + i_t * g_t
            let df_pre = dc.mul(c_prev).mul(&f_t.map(|v| v * (1.0 - v)));
            let di_pre = dc.mul(g_t).mul(&i_t.map(|v| v * (1.0 - v)));
            let dg_pre = dc.mul(i_t).mul(&g_t.map(|v| 1.0 - v * v));

            let x_t_t = x_t.transpose();
            let h_prev_t = h_prev.transpose();

            dw_xi = dw_xi.add(&x_t_t.matmul(&di_pre));
            dw_hi = dw_hi.add(&h_prev_t.matmul(&di_pre));
            db_i = db_i.add(&di_pre.sum_axis(0));
            dw_xf = dw_xf.add(&x_t_t.matmul(&df_pre));
            dw_hf = dw_hf.add(&h_prev_t.matmul(&df_pre));
            db_f = db_f.add(&df_pre.sum_axis(0));
            dw_xg = dw_xg.add(&x_t_t.matmul(&dg_pre));
            dw_hg = dw_hg.add(&h_prev_t.matmul(&dg_pre));
            db_g = db_g.add(&dg_pre.sum_axis(0));
            dw_xo = dw_xo.add(&x_t_t.matmul(&do_pre));
            dw_ho = dw_ho.add(&h_prev_t.matmul(&do_pre));
            db_o = db_o.add(&do_pre.sum_axis(0));

            let dx_t = di_pre
                .matmul(&self.w_xi.transpose())
                .add(&df_pre.matmul(&self.w_xf.transpose()))
                .add(&dg_pre.matmul(&self.w_xg.transpose()))
                .add(&do_pre.matmul(&self.w_xo.transpose()));
            Self::write_timestep(&mut dx, t, &dx_t);

            dh_next = di_pre
                .matmul(&self.w_hi.transpose())
                .add(&df_pre.matmul(&self.w_hf.transpose()))
                .add(&dg_pre.matmul(&self.w_hg.transpose()))
                .add(&do_pre.matmul(&self.w_ho.transpose()));
            dc_next = dc.mul(f_t);
        }

        self.grads = Some(vec![
            dw_xi, dw_hi, db_i, dw_xf, dw_hf, db_f, dw_xg, dw_hg, db_g, dw_xo, dw_ho, db_o,
        ]);
        Ok(dx)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![
            &self.w_xi, &self.w_hi, &self.b_i, &self.w_xf, &self.w_hf, &self.b_f, &self.w_xg,
            &self.w_hg, &self.b_g, &self.w_xo, &self.w_ho, &self.b_o,
        ]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![
            &mut self.w_xi,
            &mut self.w_hi,
            &mut self.b_i,
            &mut self.w_xf,
            &mut self.w_hf,
            &mut self.b_f,
            &mut self.w_xg,
            &mut self.w_hg,
            &mut self.b_g,
            &mut self.w_xo,
            &mut self.w_ho,
            &mut self.b_o,
        ]
    }

    fn gradients(&self) -> Vec<&Tensor> {
        match &self.grads {
            Some(grads) => grads.iter().collect(),
            None => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "Lstm"
    }
}
