// ============================================================
// Layer 5 — Stacked LSTM Note Model
// ============================================================
// Architecture (per time-step):
//
//   features (F)
//       │
//   LSTM  F → H          (tanh cell)
//       │  dropout
//   LSTM  H → H
//       │  dropout
//   Dense H → H, ReLU
//       │
//   Linear H → F, identity  → next-step feature prediction
//
// The recurrent state of both LSTM layers is returned from
// forward() as a NoteLstmState value instead of being kept
// inside the model, so the same model can serve several
// independent sequences and truncated BPTT can carry state
// across segments explicitly.
//
// Reference: Burn Book §3 (Building Blocks)
//            Graves (2013) Generating Sequences With RNNs

use burn::{
    nn::{
        Dropout, DropoutConfig, Initializer, Linear, LinearConfig, Lstm, LstmConfig, LstmState,
    },
    prelude::*,
    tensor::activation::relu,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct NoteLstmConfig {
    /// Features per time-step, both in and out
    pub n_features:  usize,
    /// Units in each recurrent and dense layer
    pub hidden_size: usize,
    pub dropout:     f64,
}

impl NoteLstmConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> NoteLstm<B> {
        let xavier = Initializer::XavierUniform { gain: 1.0 };
        let lstm_in     = LstmConfig::new(self.n_features, self.hidden_size, true)
            .with_initializer(xavier.clone())
            .init(device);
        let lstm_hidden = LstmConfig::new(self.hidden_size, self.hidden_size, true)
            .with_initializer(xavier.clone())
            .init(device);
        let dense  = LinearConfig::new(self.hidden_size, self.hidden_size)
            .with_initializer(xavier.clone())
            .init(device);
        let output = LinearConfig::new(self.hidden_size, self.n_features)
            .with_initializer(xavier)
            .init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        NoteLstm { lstm_in, lstm_hidden, dense, output, dropout }
    }
}

#[derive(Module, Debug)]
pub struct NoteLstm<B: Backend> {
    pub lstm_in:     Lstm<B>,
    pub lstm_hidden: Lstm<B>,
    pub dense:       Linear<B>,
    pub output:      Linear<B>,
    pub dropout:     Dropout,
}

/// Cell and hidden state of both recurrent layers.
pub struct NoteLstmState<B: Backend> {
    pub lstm_in:     LstmState<B, 2>,
    pub lstm_hidden: LstmState<B, 2>,
}

impl<B: Backend> NoteLstmState<B> {
    /// Same values, cut from the autodiff graph.
    pub fn detach(self) -> Self {
        Self {
            lstm_in:     detach_state(self.lstm_in),
            lstm_hidden: detach_state(self.lstm_hidden),
        }
    }
}

fn detach_state<B: Backend>(state: LstmState<B, 2>) -> LstmState<B, 2> {
    LstmState::new(state.cell.detach(), state.hidden.detach())
}

impl<B: Backend> NoteLstm<B> {
    /// x: [batch, steps, F] → predictions [batch, steps, F] and the state
    /// after the last step. `state = None` starts from zeros.
    pub fn forward(
        &self,
        x:     Tensor<B, 3>,
        state: Option<NoteLstmState<B>>,
    ) -> (Tensor<B, 3>, NoteLstmState<B>) {
        let (in_state, hidden_state) = match state {
            Some(s) => (Some(s.lstm_in), Some(s.lstm_hidden)),
            None    => (None, None),
        };

        let (h, lstm_in) = self.lstm_in.forward(x, in_state);
        let h = self.dropout.forward(h);
        let (h, lstm_hidden) = self.lstm_hidden.forward(h, hidden_state);
        let h = self.dropout.forward(h);
        let h = relu(self.dense.forward(h));
        let y = self.output.forward(h);

        (y, NoteLstmState { lstm_in, lstm_hidden })
    }

    /// Parameter count of each layer, in forward order.
    pub fn layer_param_counts(&self) -> [(&'static str, usize); 4] {
        [
            ("lstm_in",     self.lstm_in.num_params()),
            ("lstm_hidden", self.lstm_hidden.num_params()),
            ("dense",       self.dense.num_params()),
            ("output",      self.output.num_params()),
        ]
    }
}
