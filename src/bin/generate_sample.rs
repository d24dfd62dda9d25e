use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const SUBJECTS: &[&str] = &["项目", "需求", "接口", "测试", "上线", "数据迁移", "评审"];
const PROGRESS: &[&str] = &["进度正常", "出现延期", "已经完成", "存在风险", "等待确认", "顺利推进"];
const DETAILS: &[&str] = &[
    "客户反馈良好",
    "需要增加人手",
    "依赖第三方系统",
    "性能指标达标",
    "文档还在整理",
    "预算有所超支",
];
const OWNERS: &[&str] = &["李四", "王五", "赵六", "钱七"];
const STATUSES: &[&str] = &["进行中", "已完成", "延期"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let output_path = "sample_data.csv";

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record(["周报内容", "负责人", "状态", "日期"])?;

    let rows = 60;
    for i in 0..rows {
        let text = format!(
            "{}{}，{}",
            rng.pick(SUBJECTS),
            rng.pick(PROGRESS),
            rng.pick(DETAILS)
        );
        // Leave some owners blank to exercise missing values.
        let owner = if i % 11 == 10 { "" } else { *rng.pick(OWNERS) };
        let date = format!("2024-{:02}-{:02}", 1 + i / 28, 1 + i % 28);
        writer.write_record([text.as_str(), owner, *rng.pick(STATUSES), date.as_str()])?;
    }
    writer.flush()?;

    println!("Wrote {rows} rows to {output_path}");
    Ok(())
}
