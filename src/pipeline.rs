use anyhow::{Result, bail};

use crate::cloud::{CloudRenderer, WordCloud};
use crate::data::filter::{FilterSelection, filtered_rows};
use crate::data::model::Table;
use crate::text::{Segmenter, StopwordSet, join_tokens, key_text, tokenize};

// ---------------------------------------------------------------------------
// Pipeline: table + choices → cloud
// ---------------------------------------------------------------------------

/// Terminal state of one pipeline run.
pub enum Outcome {
    Rendered(WordCloud),
    /// No token survived filtering; nothing was rendered.
    InsufficientData,
}

/// Everything one run derives from its inputs.
pub struct Analysis {
    /// Indices of rows passing the filters.
    pub rows: Vec<usize>,
    pub tokens: Vec<String>,
    pub outcome: Outcome,
}

/// The long-lived resources a run needs: segmenter dictionary, stopwords, font.
pub struct Pipeline {
    segmenter: Segmenter,
    stopwords: StopwordSet,
    renderer: CloudRenderer,
}

impl Pipeline {
    pub fn new(segmenter: Segmenter, stopwords: StopwordSet, renderer: CloudRenderer) -> Self {
        Self {
            segmenter,
            stopwords,
            renderer,
        }
    }

    pub fn renderer(&self) -> &CloudRenderer {
        &self.renderer
    }

    /// Filter, tokenize and render from scratch.
    pub fn run(&self, table: &Table, key_column: &str, selection: &FilterSelection) -> Result<Analysis> {
        if table.column_index(key_column).is_none() {
            bail!("Column '{key_column}' not found");
        }
        let rows = filtered_rows(table, selection);
        let text = key_text(table, &rows, key_column).unwrap_or_default();
        let tokens = tokenize(&self.segmenter, &self.stopwords, &text);
        log::debug!(
            "{} of {} rows kept, {} tokens after stopwords",
            rows.len(),
            table.len(),
            tokens.len()
        );

        let outcome = match self.renderer.render(&join_tokens(&tokens)) {
            Some(cloud) => Outcome::Rendered(cloud),
            None => Outcome::InsufficientData,
        };
        Ok(Analysis {
            rows,
            tokens,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::export::PngExport;
    use crate::cloud::font::CloudFont;
    use crate::config::CloudConfig;
    use crate::data::model::CellValue;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn pipeline() -> Pipeline {
        let renderer = CloudRenderer::new(CloudFont::bundled().unwrap(), &CloudConfig::default());
        Pipeline::new(Segmenter::new(), StopwordSet::default(), renderer)
    }

    fn project_notes() -> Table {
        Table::new(
            vec!["内容".into(), "负责人".into()],
            vec![
                vec![s("项目 进度 正常"), s("李四")],
                vec![s("项目 延期 风险"), s("王五")],
                vec![s("项目 完成 顺利"), s("李四")],
            ],
        )
    }

    #[test]
    fn unfiltered_notes_render_a_cloud() {
        let analysis = pipeline()
            .run(&project_notes(), "内容", &FilterSelection::new())
            .unwrap();

        assert_eq!(analysis.rows, vec![0, 1, 2]);
        for word in ["项目", "进度", "正常", "延期", "风险", "完成", "顺利"] {
            assert!(analysis.tokens.iter().any(|t| t == word), "missing {word}");
        }
        for stop in ["了", "的", "是"] {
            assert!(!analysis.tokens.iter().any(|t| t == stop));
        }

        let Outcome::Rendered(cloud) = analysis.outcome else {
            panic!("expected a rendered cloud");
        };
        let export = PngExport::from_image(&cloud.image).unwrap();
        assert!(!export.bytes.is_empty());
        assert_eq!(export.file_name, "wordcloud.png");
    }

    #[test]
    fn unmatched_filter_is_insufficient_data() {
        let mut selection = FilterSelection::new();
        selection.insert("负责人".into(), [s("张三")].into_iter().collect());

        let analysis = pipeline().run(&project_notes(), "内容", &selection).unwrap();
        assert!(analysis.rows.is_empty());
        assert!(analysis.tokens.is_empty());
        assert!(matches!(analysis.outcome, Outcome::InsufficientData));
    }

    #[test]
    fn stopword_only_text_is_insufficient_data() {
        let table = Table::new(
            vec!["内容".into()],
            vec![vec![s("的 了 和")], vec![CellValue::Null]],
        );
        let analysis = pipeline().run(&table, "内容", &FilterSelection::new()).unwrap();
        assert!(analysis.tokens.is_empty());
        assert!(matches!(analysis.outcome, Outcome::InsufficientData));
    }

    #[test]
    fn single_character_tokens_are_insufficient_data() {
        let table = Table::new(vec!["内容".into()], vec![vec![s("猫，狗。鱼")]]);
        let analysis = pipeline().run(&table, "内容", &FilterSelection::new()).unwrap();
        assert!(!analysis.tokens.is_empty());
        assert!(matches!(analysis.outcome, Outcome::InsufficientData));
    }

    #[test]
    fn filter_narrows_tokens() {
        let mut selection = FilterSelection::new();
        selection.insert("负责人".into(), [s("王五")].into_iter().collect());

        let analysis = pipeline().run(&project_notes(), "内容", &selection).unwrap();
        assert_eq!(analysis.rows, vec![1]);
        assert_eq!(analysis.tokens, vec!["项目", "延期", "风险"]);
        assert!(matches!(analysis.outcome, Outcome::Rendered(_)));
    }

    #[test]
    fn repeated_runs_give_identical_tokens() {
        let p = pipeline();
        let table = project_notes();
        let first = p.run(&table, "内容", &FilterSelection::new()).unwrap().tokens;
        let second = p.run(&table, "内容", &FilterSelection::new()).unwrap().tokens;
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_key_column_is_an_error() {
        assert!(pipeline()
            .run(&project_notes(), "标题", &FilterSelection::new())
            .is_err());
    }
}
