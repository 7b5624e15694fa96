use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::domain::image::{IMAGE_CHANNELS, IMAGE_HEIGHT, IMAGE_LEN, IMAGE_WIDTH};

/// Output channels of the five encoder conv + pool stages
const ENCODER_FILTERS: [usize; 5] = [64, 64, 64, 64, 32];
const ENCODER_KERNEL:  usize = 3;
const ENCODER_HIDDEN:  usize = 32;

/// The latent vector is first projected to a 3×3×3 seed image
const DECODER_SEED_SIDE:     usize = 3;
const DECODER_SEED_CHANNELS: usize = 3;
/// Output channels of the four decoder conv + upsample stages
const DECODER_FILTERS: [usize; 4] = [8, 16, 32, 64];
const DECODER_KERNEL:  usize = 2;
const DECODER_HIDDEN:  usize = 64;

// Spatial side after five 2× pools: 32 → 1
const ENCODER_OUT_SIDE: usize = IMAGE_HEIGHT >> ENCODER_FILTERS.len();
// Spatial side after four 2× upsamples: 3 → 48
const DECODER_OUT_SIDE: usize = DECODER_SEED_SIDE << DECODER_FILTERS.len();

// #[derive(Config)] generates Clone and Serialize/Deserialize itself.
#[derive(Config, Debug)]
pub struct AutoEncoderConfig {
    pub latent_dim: usize,
}

impl AutoEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> AutoEncoder<B> {
        AutoEncoder {
            encoder: self.init_encoder(device),
            decoder: self.init_decoder(device),
        }
    }

    fn init_encoder<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        let mut in_channels = IMAGE_CHANNELS;
        let convs = ENCODER_FILTERS
            .iter()
            .map(|&out_channels| {
                let conv = Conv2dConfig::new([in_channels, out_channels], [ENCODER_KERNEL; 2])
                    .with_padding(PaddingConfig2d::Same)
                    .init(device);
                in_channels = out_channels;
                conv
            })
            .collect();
        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        let flat   = in_channels * ENCODER_OUT_SIDE * ENCODER_OUT_SIDE;
        let hidden = LinearConfig::new(flat, ENCODER_HIDDEN).init(device);
        let latent = LinearConfig::new(ENCODER_HIDDEN, self.latent_dim).init(device);

        Encoder { convs, pool, hidden, latent }
    }

    fn init_decoder<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        let seed_len = DECODER_SEED_SIDE * DECODER_SEED_SIDE * DECODER_SEED_CHANNELS;
        let seed = LinearConfig::new(self.latent_dim, seed_len).init(device);

        // Burn only offers symmetric padding, and `Same` rejects even kernels.
        // Pad by one on every side and crop the leading row/column in forward.
        let mut in_channels = DECODER_SEED_CHANNELS;
        let convs = DECODER_FILTERS
            .iter()
            .map(|&out_channels| {
                let conv = Conv2dConfig::new([in_channels, out_channels], [DECODER_KERNEL; 2])
                    .with_padding(PaddingConfig2d::Explicit(1, 1))
                    .init(device);
                in_channels = out_channels;
                conv
            })
            .collect();

        let flat   = in_channels * DECODER_OUT_SIDE * DECODER_OUT_SIDE;
        let hidden = LinearConfig::new(flat, DECODER_HIDDEN).init(device);
        let output = LinearConfig::new(DECODER_HIDDEN, IMAGE_LEN).init(device);

        Decoder { seed, convs, hidden, output }
    }

    /// Per-layer output shapes and parameter counts, derived from the
    /// architecture constants alone (no weights are allocated).
    pub fn layer_summary(&self) -> Vec<LayerSummary> {
        let mut rows = Vec::new();
        let dense = |inp: usize, out: usize| inp * out + out;
        let conv  = |k: usize, inp: usize, out: usize| k * k * inp * out + out;

        rows.push(LayerSummary::new("encoder.input", vec![IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_CHANNELS], 0));
        let (mut side, mut channels) = (IMAGE_HEIGHT, IMAGE_CHANNELS);
        for (i, &filters) in ENCODER_FILTERS.iter().enumerate() {
            rows.push(LayerSummary::new(
                format!("encoder.conv{i}"),
                vec![side, side, filters],
                conv(ENCODER_KERNEL, channels, filters),
            ));
            side /= 2;
            channels = filters;
            rows.push(LayerSummary::new(format!("encoder.pool{i}"), vec![side, side, channels], 0));
        }
        let flat = side * side * channels;
        rows.push(LayerSummary::new("encoder.flatten", vec![flat], 0));
        rows.push(LayerSummary::new("encoder.hidden", vec![ENCODER_HIDDEN], dense(flat, ENCODER_HIDDEN)));
        rows.push(LayerSummary::new(
            "encoder.latent",
            vec![self.latent_dim],
            dense(ENCODER_HIDDEN, self.latent_dim),
        ));

        let seed_len = DECODER_SEED_SIDE * DECODER_SEED_SIDE * DECODER_SEED_CHANNELS;
        rows.push(LayerSummary::new("decoder.seed", vec![seed_len], dense(self.latent_dim, seed_len)));
        let (mut side, mut channels) = (DECODER_SEED_SIDE, DECODER_SEED_CHANNELS);
        rows.push(LayerSummary::new("decoder.reshape", vec![side, side, channels], 0));
        for (i, &filters) in DECODER_FILTERS.iter().enumerate() {
            rows.push(LayerSummary::new(
                format!("decoder.conv{i}"),
                vec![side, side, filters],
                conv(DECODER_KERNEL, channels, filters),
            ));
            side *= 2;
            channels = filters;
            rows.push(LayerSummary::new(format!("decoder.upsample{i}"), vec![side, side, channels], 0));
        }
        let flat = side * side * channels;
        rows.push(LayerSummary::new("decoder.flatten", vec![flat], 0));
        rows.push(LayerSummary::new("decoder.hidden", vec![DECODER_HIDDEN], dense(flat, DECODER_HIDDEN)));
        rows.push(LayerSummary::new("decoder.output", vec![IMAGE_LEN], dense(DECODER_HIDDEN, IMAGE_LEN)));
        rows.push(LayerSummary::new("decoder.reshape_out", vec![IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_CHANNELS], 0));
        rows
    }
}

/// One row of the architecture table.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSummary {
    pub name:         String,
    pub output_shape: Vec<usize>,
    pub params:       usize,
}

impl LayerSummary {
    fn new(name: impl Into<String>, output_shape: Vec<usize>, params: usize) -> Self {
        Self { name: name.into(), output_shape, params }
    }
}

/// Render summary rows as a fixed-width table with a total line.
pub fn format_summary(title: &str, rows: &[LayerSummary]) -> String {
    let mut out = format!("{title}\n{:<22} {:<16} {:>10}\n", "layer", "output shape", "params");
    for row in rows {
        let shape = format!("{:?}", row.output_shape);
        out.push_str(&format!("{:<22} {:<16} {:>10}\n", row.name, shape, row.params));
    }
    let total: usize = rows.iter().map(|r| r.params).sum();
    out.push_str(&format!("total params: {total}"));
    out
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub convs:  Vec<Conv2d<B>>,
    pub pool:   MaxPool2d,
    pub hidden: Linear<B>,
    pub latent: Linear<B>,
}

impl<B: Backend> Encoder<B> {
    /// images: [batch, 32, 32, 3] → latent: [batch, latent_dim]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        // Burn convolutions are channels-first.
        let mut x = images.permute([0, 3, 1, 2]);
        for conv in &self.convs {
            x = self.pool.forward(relu(conv.forward(x)));
        }
        let [batch, channels, height, width] = x.dims();
        let x = x.reshape([batch, channels * height * width]);
        let x = relu(self.hidden.forward(x));
        self.latent.forward(x)
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub seed:   Linear<B>,
    pub convs:  Vec<Conv2d<B>>,
    pub hidden: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> Decoder<B> {
    /// latent: [batch, latent_dim] → images: [batch, 32, 32, 3]
    pub fn forward(&self, latent: Tensor<B, 2>) -> Tensor<B, 4> {
        let [batch, _] = latent.dims();

        let x = relu(self.seed.forward(latent));
        let mut x = x
            .reshape([batch, DECODER_SEED_SIDE, DECODER_SEED_SIDE, DECODER_SEED_CHANNELS])
            .permute([0, 3, 1, 2]);

        for conv in &self.convs {
            x = upsample_nearest(relu(conv_same_even(conv, x)));
        }

        let [_, channels, height, width] = x.dims();
        let x = x.reshape([batch, channels * height * width]);
        let x = relu(self.hidden.forward(x));
        self.output
            .forward(x)
            .reshape([batch, IMAGE_HEIGHT, IMAGE_WIDTH, IMAGE_CHANNELS])
    }
}

/// Apply a 2×2 convolution built with one pixel of padding on every
/// side, keeping only the window that matches zero padding on the
/// bottom/right edge. Output keeps the input's spatial size.
fn conv_same_even<B: Backend>(conv: &Conv2d<B>, x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [batch, _, height, width] = x.dims();
    let y = conv.forward(x);
    let [_, channels, _, _] = y.dims();
    y.slice([0..batch, 0..channels, 1..height + 1, 1..width + 1])
}

/// Nearest-neighbour 2× upsampling: [n, c, h, w] → [n, c, 2h, 2w]
pub fn upsample_nearest<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [n, c, h, w] = x.dims();
    x.reshape([n, c, h, 1, w, 1])
        .expand([n, c, h, 2, w, 2])
        .reshape([n, c, h * 2, w * 2])
}

// ─── AutoEncoder ──────────────────────────────────────────────────────────────
/// Encoder and decoder trained together. The encoder is a field of
/// this module, so `encode` and the first half of `forward` share
/// the same weights.
#[derive(Module, Debug)]
pub struct AutoEncoder<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

impl<B: Backend> AutoEncoder<B> {
    /// images: [batch, 32, 32, 3] → reconstruction: [batch, 32, 32, 3]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        self.decoder.forward(self.encoder.forward(images))
    }

    pub fn encode(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        self.encoder.forward(images)
    }
}
